// ==========================================
// 目录系统 - 数据清洗器实现
// ==========================================
// 职责: 空值替换（文本 → "NA"，数值 → 0）/ 数值文本清洗
// 策略: 行级数据缺陷只降级为警告，不使整行失败（DefaultOnMissing）
// ==========================================

use crate::domain::format::FieldType;
use crate::importer::catalog_importer_trait::DataCleaner as DataCleanerTrait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 文本字段"有意缺失"的占位值（区别于空串、0 或 false）
pub const NA_SENTINEL: &str = "NA";

// ==========================================
// FieldPolicy - 缺失值策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// 空值/非法值替换为默认值并记录警告
    #[default]
    DefaultOnMissing,
    /// 必填字段出现默认值替换时整行报错
    FailOnMissing,
}

impl FromStr for FieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default_on_missing" => Ok(FieldPolicy::DefaultOnMissing),
            "fail_on_missing" => Ok(FieldPolicy::FailOnMissing),
            other => Err(format!("política de campo desconocida: {}", other)),
        }
    }
}

// ==========================================
// 清洗结果
// ==========================================

#[derive(Debug, Clone, PartialEq)]
pub enum CleanedValue {
    Text(String),
    Number(f64),
}

impl CleanedValue {
    pub fn as_text(&self) -> String {
        match self {
            CleanedValue::Text(s) => s.clone(),
            CleanedValue::Number(n) => n.to_string(),
        }
    }

    pub fn as_number(&self) -> f64 {
        match self {
            CleanedValue::Number(n) => *n,
            CleanedValue::Text(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    Empty,
    Unparsable,
}

/// 标签的语法性别，决定警告里写 "vacío" 还是 "vacía"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelGender {
    #[default]
    Masculine,
    Feminine,
}

impl LabelGender {
    fn empty_word(self) -> &'static str {
        match self {
            LabelGender::Masculine => "vacío",
            LabelGender::Feminine => "vacía",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    pub value: CleanedValue,
    pub defaulted: Option<DefaultReason>,
}

impl Cleaned {
    pub fn is_defaulted(&self) -> bool {
        self.defaulted.is_some()
    }

    /// 默认值替换时的标准警告（引用字段标签与行号）
    pub fn warning(&self, row_number: usize, label: &str, gender: LabelGender) -> Option<String> {
        self.defaulted.map(|_| match self.value {
            CleanedValue::Text(_) => format!(
                "Fila {}: {} {}, se asignó '{}'",
                row_number,
                label,
                gender.empty_word(),
                NA_SENTINEL
            ),
            CleanedValue::Number(_) => {
                format!("Fila {}: {} vacío o inválido, se asignó 0", row_number, label)
            }
        })
    }
}

// ==========================================
// DataCleaner 实现
// ==========================================
pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean(&self, raw: &str, field_type: FieldType) -> Cleaned {
        let trimmed = raw.trim();

        match field_type {
            FieldType::Number => {
                if trimmed.is_empty() {
                    return Cleaned {
                        value: CleanedValue::Number(0.0),
                        defaulted: Some(DefaultReason::Empty),
                    };
                }
                match self.parse_number(trimmed) {
                    Some(n) => Cleaned {
                        value: CleanedValue::Number(n),
                        defaulted: None,
                    },
                    None => {
                        tracing::debug!(value = %raw, "valor numérico inválido, se sustituye por 0");
                        Cleaned {
                            value: CleanedValue::Number(0.0),
                            defaulted: Some(DefaultReason::Unparsable),
                        }
                    }
                }
            }
            FieldType::Text | FieldType::Select => {
                if trimmed.is_empty() {
                    Cleaned {
                        value: CleanedValue::Text(NA_SENTINEL.to_string()),
                        defaulted: Some(DefaultReason::Empty),
                    }
                } else {
                    Cleaned {
                        value: CleanedValue::Text(trimmed.to_string()),
                        defaulted: None,
                    }
                }
            }
        }
    }

    fn parse_number(&self, value: &str) -> Option<f64> {
        // 去掉货币符号/千分位/空白，再去掉所有非数字非小数点字符
        let digits: String = value
            .chars()
            .filter(|c| !matches!(c, '$' | ','))
            .filter(|c| !c.is_whitespace())
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        parse_leading_decimal(&digits)
    }
}

/// 解析最长的合法小数前缀（"1.2.3" → 1.2）
fn parse_leading_decimal(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;

    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            seen_digit = true;
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end = i + 1;
        } else {
            break;
        }
    }

    if !seen_digit {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}
