//! 结果落盘：CSV流式追加、文件锁保护的JSON数组追加、HTML报告壳
//! 三份产物落在同一输出目录：result.csv / result.json / index.html

pub mod html;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use colored::Colorize;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{HpResult, HttprintError};
use crate::rule::{MatchResult, STATUS_NO_RESPONSE};
use crate::utils::format_name_list;

// 输出目录名拿不到时的文件名兜底
const DEFAULT_STEM: &str = "result";

/// JSON报告中的单条记录（字段名与HTML查看器约定一致）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRecord {
    pub url: String,
    pub status_code: u16,
    pub title: String,
    // 分号连接的命中名称列表
    pub cms_list: String,
    pub other_list: String,
    pub screenshot: String,
}

impl From<&MatchResult> for ReportRecord {
    fn from(result: &MatchResult) -> Self {
        Self {
            url: result.url.clone(),
            status_code: result.status_code,
            title: result.title.clone(),
            cms_list: result.cms_list.join(";"),
            other_list: result.other_list.join(";"),
            screenshot: result.screenshot.clone(),
        }
    }
}

/// 报告汇聚器，批次内多任务并发追加
pub struct ReportSink {
    csv: Mutex<csv::Writer<File>>,
    json_path: PathBuf,
    html_name: String,
}

impl ReportSink {
    /// 创建输出目录与报告文件
    ///
    /// 三份产物以目录名命名：`<out>/<out>.csv`、`<out>.json`、
    /// `<out>.html`。CSV先落表头；HTML壳内嵌查看器页面。JSON文件
    /// 不在此处初始化：首次追加时在文件锁内按需创建，已有记录
    /// （上一次运行或并行进程写入的）得以保留。
    pub fn create(output_dir: &Path) -> HpResult<Self> {
        std::fs::create_dir_all(output_dir)?;

        let stem = output_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_STEM.to_string());

        let mut writer = csv::Writer::from_path(output_dir.join(format!("{}.csv", stem)))?;
        writer.write_record(["Url", "StatusCode", "Title", "CmsList", "OtherList"])?;
        writer.flush()?;

        let json_name = format!("{}.json", stem);
        let json_path = output_dir.join(&json_name);

        let html_name = format!("{}.html", stem);
        html::write_report_shell(&output_dir.join(&html_name), &json_name)?;

        Ok(Self {
            csv: Mutex::new(writer),
            json_path,
            html_name,
        })
    }

    /// 追加一条结果（CSV + JSON）
    pub async fn append(&self, result: &MatchResult) -> HpResult<()> {
        {
            let mut writer = self.csv.lock().await;
            writer.write_record([
                result.url.as_str(),
                &result.status_code.to_string(),
                result.title.as_str(),
                &result.cms_list.join(";"),
                &result.other_list.join(";"),
            ])?;
            writer.flush()?;
        }

        let path = self.json_path.clone();
        let record = ReportRecord::from(result);
        tokio::task::spawn_blocking(move || append_json_record(&path, &record))
            .await
            .map_err(|err| HttprintError::ReportError(format!("JSON写入任务中断：{}", err)))?
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    /// HTML报告文件名（预览服务以它作为首页）
    pub fn html_name(&self) -> &str {
        &self.html_name
    }
}

/// 文件锁保护的JSON数组追加
///
/// 流程：独占锁 → 读出整个数组（缺失或空文件按空数组） → 追加 →
/// 写临时文件 → 原子改名。多进程同时写同一份报告也不会互相覆盖。
pub fn append_json_record(path: &Path, record: &ReportRecord) -> HpResult<()> {
    let lock_path = path.with_extension("json.lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(&lock_path)?;
    lock_file.lock_exclusive()?;

    let result = append_json_locked(path, record);

    if let Err(err) = fs2::FileExt::unlock(&lock_file) {
        debug!("释放文件锁失败：{}", err);
    }

    result
}

fn append_json_locked(path: &Path, record: &ReportRecord) -> HpResult<()> {
    let mut records: Vec<ReportRecord> = match std::fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => serde_json::from_str(&content)?,
        _ => Vec::new(),
    };

    records.push(record.clone());

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, serde_json::to_string_pretty(&records)?)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

/// 控制台输出单条结果：有cms命中标绿、仅other命中标黄、无响应标红
pub fn print_match_line(result: &MatchResult) {
    let line = format!(
        "{} [{}] [{}] cms:{} other:{}",
        result.url,
        result.status_code,
        result.title,
        format_name_list(&result.cms_list),
        format_name_list(&result.other_list),
    );

    if result.status_code == STATUS_NO_RESPONSE {
        println!("{}", line.red());
    } else if !result.cms_list.is_empty() {
        println!("{}", line.green());
    } else if !result.other_list.is_empty() {
        println!("{}", line.yellow());
    } else {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(url: &str) -> MatchResult {
        MatchResult {
            url: url.to_string(),
            status_code: 200,
            title: "登录页".to_string(),
            cms_list: vec!["WordPress".to_string()],
            other_list: vec!["Nginx".to_string(), "PHP".to_string()],
            screenshot: "https://s0.wp.com/mshots/v1/x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("scan");
        let sink = ReportSink::create(&out).unwrap();
        assert_eq!(sink.html_name(), "scan.html");

        sink.append(&sample_result("https://a.example.com")).await.unwrap();
        sink.append(&sample_result("https://b.example.com")).await.unwrap();

        let csv_content = std::fs::read_to_string(out.join("scan.csv")).unwrap();
        assert!(csv_content.starts_with("Url,StatusCode,Title,CmsList,OtherList"));
        assert!(csv_content.contains("https://a.example.com,200,登录页,WordPress,Nginx;PHP"));

        let json_content = std::fs::read_to_string(out.join("scan.json")).unwrap();
        let records: Vec<ReportRecord> = serde_json::from_str(&json_content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cms_list, "WordPress");
        assert_eq!(records[0].other_list, "Nginx;PHP");

        assert!(out.join("scan.html").exists());
    }

    #[tokio::test]
    async fn test_recreate_preserves_existing_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("scan");

        let sink = ReportSink::create(&out).unwrap();
        sink.append(&sample_result("https://a.example.com")).await.unwrap();
        drop(sink);

        // 第二个进程/运行对同一输出目录再次初始化，不得清空已有记录
        let sink = ReportSink::create(&out).unwrap();
        sink.append(&sample_result("https://b.example.com")).await.unwrap();

        let json = std::fs::read_to_string(out.join("scan.json")).unwrap();
        let records: Vec<ReportRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://a.example.com");
        assert_eq!(records[1].url, "https://b.example.com");
    }

    #[test]
    fn test_append_json_record_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let record = ReportRecord::from(&sample_result("https://x.example.com"));
        append_json_record(&path, &record).unwrap();
        append_json_record(&path, &record).unwrap();

        let records: Vec<ReportRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_report_record_pascal_case_fields() {
        let record = ReportRecord::from(&sample_result("https://x.example.com"));
        let json = serde_json::to_string(&record).unwrap();
        for field in ["Url", "StatusCode", "Title", "CmsList", "OtherList", "Screenshot"] {
            assert!(json.contains(field), "缺少字段 {}", field);
        }
    }
}
