//! 内嵌HTML报告查看器
//! 生成一个静态页面壳，运行时通过fetch读取同目录的JSON结果渲染

use std::path::Path;

use crate::error::HpResult;

const TEMPLATE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<title>指纹识别报告</title>
<style>
  body { font-family: "Segoe UI", "Microsoft YaHei", sans-serif; margin: 0; background: #f5f6fa; }
  header { background: #2f3542; color: #fff; padding: 14px 24px; }
  header h1 { margin: 0; font-size: 18px; }
  .toolbar { display: flex; gap: 8px; align-items: center; padding: 12px 24px; }
  .toolbar button { border: 1px solid #ced6e0; background: #fff; padding: 6px 14px; border-radius: 4px; cursor: pointer; }
  .toolbar button.active { background: #2f3542; color: #fff; }
  .toolbar input { flex: 1; max-width: 360px; padding: 6px 10px; border: 1px solid #ced6e0; border-radius: 4px; }
  table { width: calc(100% - 48px); margin: 0 24px 24px; border-collapse: collapse; background: #fff; }
  th, td { border: 1px solid #e1e5ec; padding: 8px 12px; font-size: 13px; text-align: left; word-break: break-all; }
  th { background: #f1f2f6; }
  tr.cms td { background: #eafaf1; }
  tr.dead td { background: #fdecea; color: #999; }
  tr { cursor: pointer; }
  #modal { display: none; position: fixed; inset: 0; background: rgba(0,0,0,.6); }
  #modal .box { background: #fff; max-width: 720px; margin: 60px auto; padding: 16px; border-radius: 6px; }
  #modal img { width: 100%; }
  #top { position: fixed; right: 24px; bottom: 24px; display: none; padding: 8px 12px; }
</style>
</head>
<body>
<header><h1>指纹识别报告</h1></header>
<div class="toolbar">
  <button data-filter="all" class="active">全部 <span id="n-all">0</span></button>
  <button data-filter="cms">CMS命中 <span id="n-cms">0</span></button>
  <button data-filter="other">OTHER命中 <span id="n-other">0</span></button>
  <button data-filter="dead">无响应 <span id="n-dead">0</span></button>
  <input id="kw" type="text" placeholder="按URL/标题/指纹过滤">
</div>
<table>
  <thead><tr><th>目标</th><th>状态码</th><th>标题</th><th>CMS指纹信息</th><th>OTHER信息</th></tr></thead>
  <tbody id="rows"></tbody>
</table>
<div id="modal"><div class="box"><img id="shot" alt="快照"><p id="shot-url"></p></div></div>
<button id="top">回到顶部</button>
<script>
const DATA_FILE = ""#;

const TEMPLATE_TAIL: &str = r#"";
let records = [];
let filter = "all";

function classify(r) {
  if (r.StatusCode === 0) return "dead";
  if (r.CmsList) return "cms";
  if (r.OtherList) return "other";
  return "plain";
}

function render() {
  const kw = document.getElementById("kw").value.toLowerCase();
  const tbody = document.getElementById("rows");
  tbody.innerHTML = "";
  for (const r of records) {
    const kind = classify(r);
    if (filter !== "all" && filter !== kind) continue;
    const text = (r.Url + r.Title + r.CmsList + r.OtherList).toLowerCase();
    if (kw && !text.includes(kw)) continue;
    const tr = document.createElement("tr");
    tr.className = kind;
    for (const v of [r.Url, r.StatusCode, r.Title, r.CmsList, r.OtherList]) {
      const td = document.createElement("td");
      td.textContent = v;
      tr.appendChild(td);
    }
    tr.addEventListener("click", () => {
      document.getElementById("shot").src = r.Screenshot;
      document.getElementById("shot-url").textContent = r.Url;
      document.getElementById("modal").style.display = "block";
    });
    tbody.appendChild(tr);
  }
}

function refreshStats() {
  const count = k => records.filter(r => classify(r) === k).length;
  document.getElementById("n-all").textContent = records.length;
  document.getElementById("n-cms").textContent = count("cms");
  document.getElementById("n-other").textContent = count("other");
  document.getElementById("n-dead").textContent = count("dead");
}

fetch(DATA_FILE).then(r => r.ok ? r.json() : []).then(data => {
  records = data;
  refreshStats();
  render();
});

for (const btn of document.querySelectorAll(".toolbar button[data-filter]")) {
  btn.addEventListener("click", () => {
    document.querySelector(".toolbar button.active").classList.remove("active");
    btn.classList.add("active");
    filter = btn.dataset.filter;
    render();
  });
}
document.getElementById("kw").addEventListener("input", render);
document.getElementById("modal").addEventListener("click", e => {
  if (e.target.id === "modal") e.target.style.display = "none";
});
const topBtn = document.getElementById("top");
window.addEventListener("scroll", () => {
  topBtn.style.display = window.scrollY > 400 ? "block" : "none";
});
topBtn.addEventListener("click", () => window.scrollTo({ top: 0, behavior: "smooth" }));
</script>
</body>
</html>
"#;

/// 写出HTML报告壳，页面运行时读取同目录下的JSON结果文件
pub fn write_report_shell(path: &Path, json_name: &str) -> HpResult<()> {
    let mut page = String::with_capacity(TEMPLATE_HEAD.len() + TEMPLATE_TAIL.len() + json_name.len());
    page.push_str(TEMPLATE_HEAD);
    page.push_str(json_name);
    page.push_str(TEMPLATE_TAIL);
    std::fs::write(path, page)?;
    Ok(())
}
