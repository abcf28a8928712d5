#![allow(dead_code)]

use async_trait::async_trait;
use role_scout::models::{ReportToken, ReportTokens};
use role_scout::{
    BatchResult, LookupApi, LookupOutcome, LookupRequest, PersonRecord, ReportApi, ScoutError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// 内存版查询服务：公司名在 `failing` 中的行返回失败
pub struct FakeApi {
    failing: Vec<String>,
    report_reply: Mutex<Vec<Result<String, String>>>,
    pub lookups: Mutex<Vec<LookupRequest>>,
    pub reports: Mutex<Vec<BatchResult>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            failing: Vec::new(),
            report_reply: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
            reports: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self, company: &str) -> Self {
        self.failing.push(company.to_string());
        self
    }

    /// 按顺序返回的报告响应；用完后默认返回 "token-N"
    pub fn report_replies(self, replies: Vec<Result<&str, &str>>) -> Self {
        *self.report_reply.lock().unwrap() = replies
            .into_iter()
            .rev()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

#[async_trait]
impl LookupApi for FakeApi {
    async fn lookup(&self, request: &LookupRequest) -> LookupOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::task::yield_now().await;
        self.lookups.lock().unwrap().push(request.clone());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&request.company) {
            return LookupOutcome::Failure("Lookup failed".to_string());
        }
        LookupOutcome::Success(PersonRecord {
            first_name: Some("Pat".to_string()),
            last_name: Some(request.company.clone()),
            current_title: Some(request.role.clone()),
            confidence_score: Some(0.75),
            ..Default::default()
        })
    }
}

#[async_trait]
impl ReportApi for FakeApi {
    async fn generate_report(&self, results: &BatchResult) -> role_scout::Result<ReportTokens> {
        let count = {
            let mut reports = self.reports.lock().unwrap();
            reports.push(results.clone());
            reports.len()
        };

        let reply = self
            .report_reply
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(format!("token-{}", count)));

        match reply {
            Ok(token) => Ok(ReportTokens {
                pdf: ReportToken::new(token),
                csv: None,
            }),
            Err(message) => Err(ScoutError::report(message)),
        }
    }

    fn pdf_url(&self, token: &ReportToken) -> String {
        format!("http://scout.test/pdf-download/{}", token)
    }

    fn csv_url(&self, token: &ReportToken) -> String {
        format!("http://scout.test/csv-download/{}", token)
    }
}

/// 极简 HTTP 服务：每个连接处理一个请求，响应由 `handler(请求文本)` 决定
pub async fn spawn_server<F>(handler: F) -> (String, JoinHandle<()>)
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    spawn_flaky_server(move |request| Some(handler(request))).await
}

/// 同上，`handler` 返回 `None` 时不写响应直接断开连接
pub async fn spawn_flaky_server<F>(handler: F) -> (String, JoinHandle<()>)
where
    F: Fn(&str) -> Option<(u16, String)> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let request = read_request(&mut socket).await;
            let Some((status, body)) = handler(&request) else {
                drop(socket);
                continue;
            };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason(status),
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Internal Server Error",
    }
}

/// 请求行中的路径，如 "/lookup"
pub fn request_path(request: &str) -> &str {
    request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
}

/// 请求体（空行之后的部分）
pub fn request_body(request: &str) -> &str {
    request
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or_default()
}
