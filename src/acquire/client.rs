//! HTTP抓取客户端
//! 两阶段TLS策略：先用兼容模式（native-tls，允许旧版本协议与无效证书）
//! 抓取，失败后换现代模式（rustls，TLS 1.2起）重试一次

use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::header::{HeaderMap, CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::tls::TlsInfo;
use reqwest::{Client, Proxy};
use tracing::debug;

use crate::acquire::cert;
use crate::acquire::useragent::random_user_agent;
use crate::config::GlobalConfig;
use crate::error::HpResult;
use crate::extractor::{decode_body, HtmlExtractor};
use crate::rule::STATUS_NO_RESPONSE;

#[derive(Debug, Clone, Copy)]
enum TlsPhase {
    Legacy,
    Modern,
}

/// 单个目标抓取后提取出的全部信号
#[derive(Debug, Clone, Default)]
pub struct ResponseSignals {
    // 跟随重定向后的最终URL，favicon候选以它的站点根为基准解析
    pub final_url: String,
    pub status_code: u16,
    pub title: String,
    pub body: String,
    // 逐行展平的响应头文本，形如 "Server: nginx\n"
    pub header_text: String,
    pub cert_text: String,
    // 页面link标签声明的favicon href（原样，未解析）
    pub favicon_links: Vec<String>,
}

impl ResponseSignals {
    /// 目标不可达时的占位信号
    pub fn unreachable(url: &str) -> Self {
        Self {
            final_url: url.to_string(),
            status_code: STATUS_NO_RESPONSE,
            ..Self::default()
        }
    }
}

/// HTTP抓取器，持有两个不同TLS策略的客户端
/// 随机源在构造时播种一次，后续所有请求共享
pub struct HttpAcquirer {
    legacy: Client,
    modern: Client,
    rng: Mutex<StdRng>,
}

impl HttpAcquirer {
    pub fn new(config: &GlobalConfig) -> HpResult<Self> {
        Ok(Self {
            legacy: build_client(config, TlsPhase::Legacy)?,
            modern: build_client(config, TlsPhase::Modern)?,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// 抓取目标并提取信号，网络失败返回Err
    pub async fn fetch(&self, url: &str) -> HpResult<ResponseSignals> {
        match self.try_fetch(url, TlsPhase::Legacy).await {
            Ok(signals) => Ok(signals),
            Err(err) => {
                debug!("兼容模式抓取失败，切换现代TLS重试 {}：{}", url, err);
                self.try_fetch(url, TlsPhase::Modern).await
            }
        }
    }

    /// 抓取目标，不可达时降级为占位信号（状态码0）
    pub async fn get_response(&self, url: &str) -> ResponseSignals {
        match self.fetch(url).await {
            Ok(signals) => signals,
            Err(err) => {
                debug!("目标不可达 {}：{}", url, err);
                ResponseSignals::unreachable(url)
            }
        }
    }

    /// 抓取原始字节（favicon与独立哈希模式使用）
    /// 与fetch同一套降级契约：任何HTTP状态码都算成功，只有传输层
    /// 失败才返回Err
    pub async fn fetch_bytes(&self, url: &str) -> HpResult<Vec<u8>> {
        match self.try_fetch_bytes(url, TlsPhase::Legacy).await {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                debug!("兼容模式下载失败，切换现代TLS重试 {}：{}", url, err);
                self.try_fetch_bytes(url, TlsPhase::Modern).await
            }
        }
    }

    async fn try_fetch(&self, url: &str, phase: TlsPhase) -> HpResult<ResponseSignals> {
        let resp = self
            .client(phase)
            .get(url)
            .header(USER_AGENT, self.pick_user_agent())
            .header(REFERER, url)
            .send()
            .await?;

        let status_code = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let cert_text = resp
            .extensions()
            .get::<TlsInfo>()
            .and_then(|info| info.peer_certificate())
            .and_then(cert::describe_der)
            .unwrap_or_default();
        let header_text = flatten_headers(resp.headers());
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let bytes = resp.bytes().await?;
        let body = decode_body(&bytes, content_type.as_deref());
        let extracted = HtmlExtractor::new().extract(&body);

        Ok(ResponseSignals {
            final_url,
            status_code,
            title: extracted.get_title(),
            body,
            header_text,
            cert_text,
            favicon_links: extracted.get_favicon_hrefs(),
        })
    }

    async fn try_fetch_bytes(&self, url: &str, phase: TlsPhase) -> HpResult<Vec<u8>> {
        let resp = self
            .client(phase)
            .get(url)
            .header(USER_AGENT, self.pick_user_agent())
            .header(REFERER, url)
            .send()
            .await?;

        Ok(resp.bytes().await?.to_vec())
    }

    fn client(&self, phase: TlsPhase) -> &Client {
        match phase {
            TlsPhase::Legacy => &self.legacy,
            TlsPhase::Modern => &self.modern,
        }
    }

    fn pick_user_agent(&self) -> &'static str {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        random_user_agent(&mut *rng)
    }
}

fn build_client(config: &GlobalConfig, phase: TlsPhase) -> HpResult<Client> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(10))
        .danger_accept_invalid_certs(true)
        .tls_info(true)
        .gzip(true);

    builder = match phase {
        TlsPhase::Legacy => builder
            .use_native_tls()
            .danger_accept_invalid_hostnames(true)
            .min_tls_version(reqwest::tls::Version::TLS_1_0),
        TlsPhase::Modern => builder
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2),
    };

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    Ok(builder.build()?)
}

/// 响应头展平为逐行文本，头名还原为规范大小写（Content-Type风格）
fn flatten_headers(headers: &HeaderMap) -> String {
    let mut text = String::new();
    for (name, value) in headers {
        let _ = writeln!(
            text,
            "{}: {}",
            canonical_header_name(name.as_str()),
            String::from_utf8_lossy(value.as_bytes())
        );
    }
    text
}

fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_canonical_header_name() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("server"), "Server");
        assert_eq!(
            canonical_header_name("x-powered-by"),
            "X-Powered-By"
        );
    }

    #[test]
    fn test_flatten_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("server", HeaderValue::from_static("nginx/1.18.0"));
        headers.insert("x-powered-by", HeaderValue::from_static("PHP/7.4"));

        let text = flatten_headers(&headers);
        assert!(text.contains("Server: nginx/1.18.0\n"));
        assert!(text.contains("X-Powered-By: PHP/7.4\n"));
    }

    #[test]
    fn test_unreachable_signals() {
        let signals = ResponseSignals::unreachable("http://127.0.0.1:1");
        assert_eq!(signals.status_code, STATUS_NO_RESPONSE);
        assert_eq!(signals.final_url, "http://127.0.0.1:1");
        assert!(signals.title.is_empty());
        assert!(signals.favicon_links.is_empty());
    }
}
