//! 报告预览服务
//! 在随机端口起一个带Basic认证的静态文件服务，扫描期间与结束后
//! 都可直接浏览输出目录里的HTML报告

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use crate::error::{HpResult, HttprintError};

// 请求头读取上限，预览服务只处理简单GET
const MAX_REQUEST_BYTES: usize = 8 * 1024;

const AUTH_USERNAME: &str = "httprint";

pub struct PreviewServer {
    root: PathBuf,
    // 根路径"/"落到的文件名（HTML报告）
    index: String,
    expected_auth: String,
    password: String,
}

impl PreviewServer {
    pub fn new(root: PathBuf, index: String, password: String) -> Self {
        Self {
            root,
            index,
            expected_auth: expected_auth(AUTH_USERNAME, &password),
            password,
        }
    }

    pub fn username(&self) -> &str {
        AUTH_USERNAME
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// 绑定随机空闲端口
    pub async fn bind(&self) -> HpResult<TcpListener> {
        Ok(TcpListener::bind(("0.0.0.0", 0)).await?)
    }

    /// 接受连接并逐个处理，调用方负责决定服务生命周期
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let server = self.clone();
                    tokio::spawn(async move {
                        if let Err(err) = server.handle_connection(stream).await {
                            debug!("预览连接处理失败 {}：{}", peer, err);
                        }
                    });
                }
                Err(err) => {
                    warn!("预览服务accept失败：{}", err);
                }
            }
        }
    }

    async fn handle_connection(&self, mut stream: TcpStream) -> HpResult<()> {
        let mut buf = vec![0u8; MAX_REQUEST_BYTES];
        let mut read = 0;
        while read < buf.len() {
            let n = stream.read(&mut buf[read..]).await?;
            if n == 0 {
                break;
            }
            read += n;
            if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let request = String::from_utf8_lossy(&buf[..read]).into_owned();

        let Some((method, raw_path)) = parse_request_line(&request) else {
            return respond(&mut stream, 400, "text/plain; charset=utf-8", b"bad request").await;
        };
        debug!("预览请求：{} {}", method, raw_path);

        if method != "GET" {
            return respond(&mut stream, 405, "text/plain; charset=utf-8", b"method not allowed")
                .await;
        }

        if !request_authorized(&request, &self.expected_auth) {
            let body = b"unauthorized";
            let head = format!(
                "HTTP/1.0 401 Unauthorized\r\nWWW-Authenticate: Basic realm=\"httprint report\"\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).await?;
            stream.write_all(body).await?;
            return Ok(());
        }

        let Some(relative) = sanitize_path(&raw_path) else {
            return respond(&mut stream, 403, "text/plain; charset=utf-8", b"forbidden").await;
        };
        let relative = if relative.is_empty() {
            self.index.clone()
        } else {
            relative
        };

        let file_path = self.root.join(&relative);
        match tokio::fs::read(&file_path).await {
            Ok(content) => {
                respond(&mut stream, 200, content_type_for(&file_path), &content).await
            }
            Err(_) => respond(&mut stream, 404, "text/plain; charset=utf-8", b"not found").await,
        }
    }
}

async fn respond(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> HpResult<()> {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Error",
    };
    let head = format!(
        "HTTP/1.0 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
        status,
        reason,
        content_type,
        body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body).await?;
    Ok(())
}

/// 期望的Authorization头取值
fn expected_auth(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{}:{}", username, password))
    )
}

fn parse_request_line(request: &str) -> Option<(String, String)> {
    let line = request.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();
    Some((method, path))
}

fn request_authorized(request: &str, expected: &str) -> bool {
    request.lines().any(|line| {
        line.split_once(':')
            .map(|(name, value)| {
                name.eq_ignore_ascii_case("authorization") && value.trim() == expected
            })
            .unwrap_or(false)
    })
}

/// 请求路径归一化：去掉query、拒绝目录穿越；根路径返回空串，
/// 由调用方落到报告首页
fn sanitize_path(raw: &str) -> Option<String> {
    let path = raw.split('?').next().unwrap_or(raw);
    let path = path.trim_start_matches('/');
    if path.split('/').any(|seg| seg == "..") {
        return None;
    }
    Some(path.to_string())
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("csv") => "text/csv; charset=utf-8",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// 本机对外IP：向公网地址发起UDP connect（不实际发包）读取本地地址
pub fn local_ip() -> HpResult<IpAddr> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0")?;
    socket
        .connect("8.8.8.8:80")
        .map_err(|err| HttprintError::FetchError(format!("本机IP探测失败：{}", err)))?;
    Ok(socket.local_addr()?.ip())
}
