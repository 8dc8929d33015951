//! 批量执行器
//! 信号量限流 + 每目标一个任务，结果边产出边落盘

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::warn;

use crate::acquire::HttpAcquirer;
use crate::detector::FingerMatcher;
use crate::report::{self, ReportSink};
use crate::rule::STATUS_NO_RESPONSE;

/// 一个批次的汇总统计
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub total: usize,
    pub unreachable: usize,
    pub cms_hits: usize,
    pub report_errors: usize,
}

pub struct BatchRunner {
    matcher: Arc<FingerMatcher>,
    acquirer: Arc<HttpAcquirer>,
    sink: Arc<ReportSink>,
    semaphore: Arc<Semaphore>,
}

impl BatchRunner {
    pub fn new(
        matcher: FingerMatcher,
        acquirer: HttpAcquirer,
        sink: ReportSink,
        concurrency: usize,
    ) -> Self {
        Self {
            matcher: Arc::new(matcher),
            acquirer: Arc::new(acquirer),
            sink: Arc::new(sink),
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// 执行整批目标，每个输入URL恰好产出一条结果
    pub async fn run(&self, targets: Vec<String>) -> RunStats {
        let mut handles = Vec::with_capacity(targets.len());

        for target in targets {
            let semaphore = self.semaphore.clone();
            let matcher = self.matcher.clone();
            let acquirer = self.acquirer.clone();
            let sink = self.sink.clone();

            handles.push(tokio::spawn(async move {
                // 信号量只在进程退出时关闭，此处拿不到许可直接计为写入失败
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (false, false, true);
                };

                let result = matcher.fingerprint(&acquirer, &target).await;
                report::print_match_line(&result);

                let report_error = match sink.append(&result).await {
                    Ok(()) => false,
                    Err(err) => {
                        warn!("结果写入失败 {}：{}", target, err);
                        true
                    }
                };

                (
                    result.status_code == STATUS_NO_RESPONSE,
                    !result.cms_list.is_empty(),
                    report_error,
                )
            }));
        }

        let mut stats = RunStats {
            total: handles.len(),
            ..RunStats::default()
        };

        for handle in handles {
            match handle.await {
                Ok((unreachable, cms_hit, report_error)) => {
                    if unreachable {
                        stats.unreachable += 1;
                    }
                    if cms_hit {
                        stats.cms_hits += 1;
                    }
                    if report_error {
                        stats.report_errors += 1;
                    }
                }
                Err(err) => {
                    warn!("任务异常退出：{}", err);
                    stats.report_errors += 1;
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::report::ReportRecord;

    #[tokio::test]
    async fn test_unreachable_targets_still_produce_results() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("scan");
        let config = ConfigManager::custom().timeout_secs(2).build();
        let runner = BatchRunner::new(
            FingerMatcher::new(Vec::new()),
            HttpAcquirer::new(&config).unwrap(),
            ReportSink::create(&out).unwrap(),
            4,
        );

        let targets = vec![
            "http://127.0.0.1:1".to_string(),
            "http://127.0.0.1:2".to_string(),
        ];
        let stats = runner.run(targets).await;

        assert_eq!(stats.total, 2);
        assert_eq!(stats.unreachable, 2);
        assert_eq!(stats.report_errors, 0);

        let json = std::fs::read_to_string(out.join("scan.json")).unwrap();
        let records: Vec<ReportRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status_code == 0));
    }
}
