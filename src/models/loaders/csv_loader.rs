//! 表格解析与行提取
//!
//! 只识别 "Title" 和 "Company Name" 两列，其它列一律忽略。

use crate::error::{InputError, Result, ScoutError};
use crate::models::batch::BatchRow;
use std::path::Path;
use tokio::fs;

const TITLE_COLUMN: &str = "title";
const COMPANY_COLUMN: &str = "company name";
const UTF8_BOM: char = '\u{feff}';

/// 解析一行逗号分隔文本
///
/// 双引号切换"引号内"状态，引号内的逗号不作为分隔符。每个字段去除首尾
/// 空白，再去掉一个开头和一个结尾的双引号。不处理转义引号，格式错误的
/// 引号不会报错，只按最接近的字段边界切分。
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => fields.push(clean_field(&std::mem::take(&mut current))),
            _ => current.push(ch),
        }
    }
    fields.push(clean_field(&current));

    fields
}

fn clean_field(raw: &str) -> String {
    let field = raw.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    let field = field.strip_suffix('"').unwrap_or(field);
    field.to_string()
}

/// 表头名称规范化：小写，内部空白折叠为单个空格
fn normalize_header(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 行提取结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// 有效数据行（最多 `max_rows` 行）
    pub rows: Vec<BatchRow>,
    /// 超出行数上限而未读取的数据行数
    pub lines_beyond_cap: usize,
    /// 没有产生任何行时的原因
    pub issue: Option<InputError>,
}

impl Extraction {
    fn rejected(issue: InputError) -> Self {
        Self {
            issue: Some(issue),
            ..Default::default()
        }
    }

    /// 至少一行时返回行，否则返回输入错误
    pub fn into_rows(self) -> std::result::Result<Vec<BatchRow>, InputError> {
        if self.rows.is_empty() {
            return Err(self.issue.unwrap_or(InputError::NoValidRows));
        }
        Ok(self.rows)
    }
}

/// 从原始文本提取行
///
/// - 空行先被丢弃；少于两行（表头 + 至少一行数据）时没有结果
/// - 表头必须同时包含 Title 和 Company Name（不区分大小写、空白折叠）
/// - 只读取前 `max_rows` 行数据，其余行只计数不解析
/// - 两个字段都为空的行被丢弃
pub fn extract(text: &str, max_rows: usize) -> Extraction {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    if lines.is_empty() {
        return Extraction::rejected(InputError::EmptyFile);
    }
    if lines.len() < 2 {
        return Extraction::rejected(InputError::MissingHeader);
    }

    let header: Vec<String> = parse_line(lines[0])
        .iter()
        .map(|h| normalize_header(h))
        .collect();
    let title_idx = header.iter().position(|h| h == TITLE_COLUMN);
    let company_idx = header.iter().position(|h| h == COMPANY_COLUMN);

    let (title_idx, company_idx) = match (title_idx, company_idx) {
        (Some(t), Some(c)) => (t, c),
        (t, c) => {
            return Extraction::rejected(InputError::MissingColumns {
                title: t.is_none(),
                company: c.is_none(),
            })
        }
    };

    let data_lines = &lines[1..];
    let read = data_lines.len().min(max_rows);

    let rows: Vec<BatchRow> = data_lines[..read]
        .iter()
        .map(|line| {
            let fields = parse_line(line);
            let field = |idx: usize| fields.get(idx).map(|f| f.trim()).unwrap_or_default();
            BatchRow::new(field(title_idx), field(company_idx))
        })
        .filter(|row| !row.is_blank())
        .collect();

    let issue = rows.is_empty().then_some(InputError::NoValidRows);

    Extraction {
        rows,
        lines_beyond_cap: data_lines.len() - read,
        issue,
    }
}

/// 只返回行（不关心原因）
pub fn extract_rows(text: &str, max_rows: usize) -> Vec<BatchRow> {
    extract(text, max_rows).rows
}

/// 读取上传的表格文件
pub async fn load_csv_file(path: &Path) -> Result<String> {
    let raw = fs::read(path).await.map_err(|e| ScoutError::io(path, e))?;
    let text = String::from_utf8_lossy(&raw).into_owned();

    tracing::info!(
        "正在加载: {} ({} 字节)",
        path.file_name().unwrap_or_default().to_string_lossy(),
        raw.len()
    );

    Ok(text)
}
