use std::io::{self, BufRead, BufReader, Cursor, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lookbook_contracts::assets::ImageAsset;
use serde_json::Value;

use crate::backend::GenerationBackend;
use crate::client::build_request_body;
use crate::intake::image_dimensions;
use crate::outcome::GenerationResult;

pub(crate) fn png_asset(width: u32, height: u32) -> ImageAsset {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 120, 200])))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode test png");
    ImageAsset::new(bytes, "image/png")
}

#[derive(Debug, Clone)]
pub(crate) struct SeenCall {
    pub model_dimensions: Option<(u32, u32)>,
    pub product_dimensions: Option<(u32, u32)>,
    pub instruction: String,
    pub request_body: Value,
}

/// Backend that answers every call with a fixed result and records what it
/// was given.
pub(crate) struct StubBackend {
    reply: GenerationResult,
    calls: AtomicUsize,
    seen: Mutex<Vec<SeenCall>>,
}

impl StubBackend {
    pub(crate) fn new(reply: GenerationResult) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn succeeding() -> Self {
        Self::new(GenerationResult::Success {
            image: ImageAsset::new(b"generated".to_vec(), "image/png"),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn seen(&self) -> Vec<SeenCall> {
        self.seen.lock().expect("seen lock").clone()
    }
}

impl GenerationBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn generate(
        &self,
        model_image: &ImageAsset,
        product_image: &ImageAsset,
        instruction: &str,
    ) -> GenerationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("seen lock").push(SeenCall {
            model_dimensions: image_dimensions(model_image),
            product_dimensions: image_dimensions(product_image),
            instruction: instruction.to_string(),
            request_body: build_request_body(instruction, model_image, product_image),
        });
        self.reply.clone()
    }
}

/// Answers exactly one HTTP request and hands back the raw request text.
pub(crate) fn serve_once(status_line: &str, body: String) -> (String, JoinHandle<String>) {
    let (base, handle) = serve_requests(status_line, body, 1);
    let handle = thread::spawn(move || {
        handle
            .join()
            .unwrap_or_default()
            .into_iter()
            .next()
            .unwrap_or_default()
    });
    (base, handle)
}

/// Answers `count` sequential HTTP requests with the same response.
pub(crate) fn serve_requests(
    status_line: &str,
    body: String,
    count: usize,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let status_line = status_line.to_string();
    let handle = thread::spawn(move || {
        let mut requests = Vec::with_capacity(count);
        for _ in 0..count {
            let Ok((stream, _)) = listener.accept() else {
                break;
            };
            requests.push(answer(stream, &status_line, &body));
        }
        requests
    });
    (format!("http://{addr}"), handle)
}

fn answer(stream: TcpStream, status_line: &str, body: &str) -> String {
    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        head.push_str(&line);
    }
    let mut request_body = vec![0u8; content_length];
    let _ = reader.read_exact(&mut request_body);
    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
    format!("{head}\r\n{}", String::from_utf8_lossy(&request_body))
}

#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer lock")).to_string()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a plain-text subscriber installed on this thread and returns
/// its value together with everything that was logged.
pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs.text())
}
