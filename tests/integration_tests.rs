/*
 * Integration tests for sensorjson
 *
 * These run the real accept loop on a loopback port and talk to it over
 * TCP, the way a browser or monitoring client would.
 */

use std::fs;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockall::mock;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use sensorjson::{bind, serve};
use sj_core::{
    Computer, Hardware, HardwareProvider, HardwareType, HwmonProvider, MemoryProvider,
    MonitorSettings, NullSource, Sensor, SensorSource, SensorType,
};
use sj_error::SensorJsonError;
use sj_protocol::{decode_snapshot, ErrorBody};

mock! {
    Source {}
    impl SensorSource for Source {
        fn refresh(&mut self, sensors: &mut [Sensor]) -> sj_error::Result<()>;
    }
}

/// Source whose reading is set from the test
struct StubSource {
    value: Arc<Mutex<f32>>,
}

impl SensorSource for StubSource {
    fn refresh(&mut self, sensors: &mut [Sensor]) -> sj_error::Result<()> {
        let value = *self.value.lock().unwrap();
        for sensor in sensors.iter_mut() {
            sensor.set_value(Some(value));
        }
        Ok(())
    }
}

fn cpu_with(source: Box<dyn SensorSource>) -> Hardware {
    let mut cpu = Hardware::new("/intelcpu/0".parse().unwrap(), "CPU", HardwareType::Cpu, source);
    cpu.add_sensor("CPU Core #1", SensorType::Temperature);
    cpu
}

async fn start(computer: Computer) -> SocketAddr {
    let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, computer));
    addr
}

/// Send one request and split the response into head and body
async fn request(addr: SocketAddr, raw: &[u8]) -> (String, Vec<u8>) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();

    let split = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has a header terminator");
    let head = String::from_utf8(response[..split].to_vec()).unwrap();
    (head, response[split + 4..].to_vec())
}

async fn get(addr: SocketAddr) -> (String, Vec<u8>) {
    request(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await
}

// ============================================================================
// Request loop
// ============================================================================

#[tokio::test]
async fn test_response_headers_and_body() {
    let value = Arc::new(Mutex::new(45.0));
    let computer = Computer::with_hardware(
        MonitorSettings::default(),
        vec![cpu_with(Box::new(StubSource { value }))],
    );
    let addr = start(computer).await;

    let (head, body) = get(addr).await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(head.contains("Access-Control-Allow-Origin: *"));
    assert!(head.contains("Content-Type: application/json"));
    assert!(head.contains(&format!("Content-Length: {}", body.len())));

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json[0]["Name"], "CPU");
    assert_eq!(json[0]["Identifier"], "/intelcpu/0");
    assert_eq!(json[0]["SubHardware"], serde_json::json!([]));
    assert_eq!(json[0]["Sensors"][0]["Name"], "CPU Core #1");
    assert_eq!(json[0]["Sensors"][0]["Identifier"], "/intelcpu/0/temperature/0");
    assert_eq!(json[0]["Sensors"][0]["Value"], 45.0);
}

#[tokio::test]
async fn test_method_and_path_are_ignored() {
    let computer = Computer::with_hardware(
        MonitorSettings::default(),
        vec![cpu_with(Box::new(NullSource))],
    );
    let addr = start(computer).await;

    let (_, from_get) = get(addr).await;
    let (head, from_post) =
        request(addr, b"POST /anything?x=1 HTTP/1.0\r\nContent-Length: 0\r\n\r\n").await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert_eq!(from_get, from_post);
}

#[tokio::test]
async fn test_each_request_sees_fresh_values() {
    let value = Arc::new(Mutex::new(40.0));
    let computer = Computer::with_hardware(
        MonitorSettings::default(),
        vec![cpu_with(Box::new(StubSource { value: value.clone() }))],
    );
    let addr = start(computer).await;

    let (_, first) = get(addr).await;
    *value.lock().unwrap() = 52.5;
    let (_, second) = get(addr).await;

    let first = decode_snapshot(&first).unwrap();
    let second = decode_snapshot(&second).unwrap();
    assert_eq!(first[0].sensors[0].value, Some(40.0));
    assert_eq!(second[0].sensors[0].value, Some(52.5));
    assert_eq!(second[0].sensors[0].min, Some(40.0));
    assert_eq!(second[0].sensors[0].max, Some(52.5));
}

#[tokio::test]
async fn test_keeps_serving_after_disconnects() {
    let computer = Computer::with_hardware(
        MonitorSettings::default(),
        vec![cpu_with(Box::new(NullSource))],
    );
    let addr = start(computer).await;

    // Connect and leave without a request
    drop(TcpStream::connect(addr).await.unwrap());

    // Send a request and leave before reading the response
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    drop(stream);

    let (head, body) = get(addr).await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert_eq!(decode_snapshot(&body).unwrap().len(), 1);
}

/// Enough sensors that the body cannot fit in the loopback socket buffers
fn large_tree() -> Computer {
    let name = "Drive Temperature ".repeat(12);
    let hardware = (0..100)
        .map(|i| {
            let mut hdd = Hardware::new(
                format!("/hdd/{}", i).parse().unwrap(),
                format!("Drive #{}", i),
                HardwareType::Hdd,
                Box::new(NullSource),
            );
            for _ in 0..400 {
                hdd.add_sensor(name.trim_end(), SensorType::Temperature);
            }
            hdd
        })
        .collect();
    Computer::with_hardware(MonitorSettings::default(), hardware)
}

#[tokio::test]
async fn test_reset_during_large_response() {
    let addr = start(large_tree()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let mut partial = [0u8; 1024];
    stream.read_exact(&mut partial).await.unwrap();
    assert!(partial.starts_with(b"HTTP/1.1 200 OK"));

    // Abort with RST while the server is still writing the body
    #[allow(deprecated)]
    stream.set_linger(Some(Duration::ZERO)).unwrap();
    drop(stream);

    let (head, body) = get(addr).await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(body.len() > 8 * 1024 * 1024, "body is only {} bytes", body.len());
    let nodes = decode_snapshot(&body).unwrap();
    assert_eq!(nodes.len(), 100);
    assert_eq!(nodes[99].sensors.len(), 400);
}

#[tokio::test]
async fn test_provider_failure_then_recovery() {
    let mut source = MockSource::new();
    let mut calls = 0;
    source.expect_refresh().times(2).returning(move |sensors| {
        calls += 1;
        if calls == 1 {
            return Err(SensorJsonError::hardware_read("/intelcpu/0", "read failed"));
        }
        sensors[0].set_value(Some(61.0));
        Ok(())
    });
    let computer = Computer::with_hardware(
        MonitorSettings::default(),
        vec![cpu_with(Box::new(source))],
    );
    let addr = start(computer).await;

    let (head, body) = get(addr).await;
    assert!(head.starts_with("HTTP/1.1 500 Internal Server Error"));
    assert!(head.contains("Access-Control-Allow-Origin: *"));
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.status, 500);
    assert!(error.error.contains("read failed"));

    let (head, body) = get(addr).await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert_eq!(decode_snapshot(&body).unwrap()[0].sensors[0].value, Some(61.0));
}

// ============================================================================
// Providers end to end
// ============================================================================

fn fake_chip(root: &std::path::Path, hwmon: &str, driver: &str, files: &[(&str, &str)]) {
    let dir = root.join(hwmon);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("name"), format!("{}\n", driver)).unwrap();
    for (file, contents) in files {
        fs::write(dir.join(file), contents).unwrap();
    }
}

#[tokio::test]
async fn test_fake_sysfs_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let hwmon_root = tmp.path().join("hwmon");
    fake_chip(&hwmon_root, "hwmon0", "nct6798", &[("fan1_input", "850"), ("fan1_label", "CPU Fan")]);
    fake_chip(&hwmon_root, "hwmon1", "k10temp", &[("temp1_input", "51250"), ("temp1_label", "Tctl")]);
    fs::write(tmp.path().join("board_name"), "B650 AORUS ELITE\n").unwrap();
    let meminfo = tmp.path().join("meminfo");
    fs::write(&meminfo, "MemTotal: 8388608 kB\nMemAvailable: 2097152 kB\n").unwrap();

    let hwmon = HwmonProvider::with_paths(&hwmon_root, tmp.path().join("board_name"));
    let memory = MemoryProvider::new(&meminfo);
    let providers: [&dyn HardwareProvider; 2] = [&hwmon, &memory];
    let mut computer = Computer::new(MonitorSettings::default());
    computer.open(&providers).unwrap();

    let addr = start(computer).await;
    let (_, body) = get(addr).await;
    let nodes = decode_snapshot(&body).unwrap();

    let ids: Vec<&str> = nodes.iter().map(|n| n.identifier.as_str()).collect();
    assert_eq!(ids, vec!["/mainboard", "/amdcpu/0", "/ram"]);

    let board = &nodes[0];
    assert_eq!(board.name, "B650 AORUS ELITE");
    assert_eq!(board.hardware_type, "Mainboard");
    assert!(board.sensors.is_empty());
    assert_eq!(board.sub_hardware[0].identifier, "/lpc/nct6798/0");
    assert_eq!(board.sub_hardware[0].hardware_type, "SuperIO");
    assert_eq!(board.sub_hardware[0].sensors[0].name, "CPU Fan");
    assert_eq!(board.sub_hardware[0].sensors[0].value, Some(850.0));

    assert_eq!(nodes[1].sensors[0].name, "Tctl");
    assert_eq!(nodes[1].sensors[0].value, Some(51.25));

    let ram = &nodes[2];
    assert_eq!(ram.sensors[0].sensor_type, "Load");
    assert_eq!(ram.sensors[0].value, Some(75.0));
    assert_eq!(ram.sensors[2].name, "Available Memory");
    assert_eq!(ram.sensors[2].value, Some(2.0));
}
