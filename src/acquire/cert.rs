//! TLS证书文本化
//! 将握手拿到的站点证书（DER）展开为可供cert=谓词匹配的纯文本

use std::fmt::Write as _;

use tracing::debug;
use x509_parser::prelude::*;

/// 将DER编码证书展开为多行文本
///
/// 文本包含版本、序列号、主体、签发者、有效期、签名算法与SAN列表，
/// 每项一行。解析失败返回None（证书文本缺省为空串，谓词自然不命中）。
pub fn describe_der(der: &[u8]) -> Option<String> {
    let (_, cert) = match parse_x509_certificate(der) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!("证书解析失败：{}", err);
            return None;
        }
    };

    let mut text = String::new();
    let _ = writeln!(text, "Version: {}", cert.version());
    let _ = writeln!(text, "Serial Number: {}", cert.raw_serial_as_string());
    let _ = writeln!(text, "Subject: {}", cert.subject());
    let _ = writeln!(text, "Issuer: {}", cert.issuer());
    let _ = writeln!(text, "Not Before: {}", cert.validity().not_before);
    let _ = writeln!(text, "Not After: {}", cert.validity().not_after);
    let _ = writeln!(
        text,
        "Signature Algorithm: {}",
        cert.signature_algorithm.algorithm
    );
    let _ = writeln!(
        text,
        "Public Key Algorithm: {}",
        cert.public_key().algorithm.algorithm
    );

    if let Ok(Some(san)) = cert.subject_alternative_name() {
        let names: Vec<String> = san
            .value
            .general_names
            .iter()
            .map(|name| name.to_string())
            .collect();
        if !names.is_empty() {
            let _ = writeln!(text, "Subject Alternative Names: {}", names.join(", "));
        }
    }

    for ext in cert.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::AuthorityInfoAccess(aia) => {
                for desc in &aia.accessdescs {
                    let _ = writeln!(
                        text,
                        "Authority Info Access: {} {}",
                        desc.access_method, desc.access_location
                    );
                }
            }
            ParsedExtension::CRLDistributionPoints(points) => {
                for point in points.iter() {
                    if let Some(DistributionPointName::FullName(names)) = &point.distribution_point
                    {
                        for name in names {
                            let _ = writeln!(text, "CRL Distribution Point: {}", name);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Some(text)
}
