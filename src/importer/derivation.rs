// ==========================================
// 目录系统 - 字段派生服务
// ==========================================
// 职责: 名称生成 / 部门推断 / 条码与 clave 生成 / 销售单位
// 说明: 关键字表与停用词表来自 ImportSettings，可按部署覆写
// ==========================================

use crate::config::import_settings::DepartmentKeywords;
use crate::domain::departamento::sale_unit_for;
use rand::Rng;

/// 按单个空格切分，每个词首字母大写、其余小写
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || "áéíóúñüÁÉÍÓÚÑÜ".contains(c)
}

/// 由描述生成展示名称
///
/// # 规则
/// 1. 非单词字符替换为空格并合并空白
/// 2. 不超过 3 个词 → 整体首字母大写
/// 3. 否则取前 3 个"有效词"（长度 > 2 且不在停用词表）
/// 4. 有效词不足 2 个 → 用 clave（`-`/`_` 换成空格）
pub fn name_from_description(descripcion: &str, clave: &str, stopwords: &[String]) -> String {
    let cleaned: String = descripcion
        .trim()
        .chars()
        .map(|c| if is_name_char(c) { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    if words.len() <= 3 {
        return title_case(&words.join(" "));
    }

    let significant: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| w.chars().count() > 2)
        .filter(|w| {
            let lower = w.to_lowercase();
            !stopwords.iter().any(|s| *s == lower)
        })
        .collect();

    if significant.len() >= 2 {
        let take = significant.len().min(3);
        return title_case(&significant[..take].join(" "));
    }

    title_case(&clave.replace(['-', '_'], " "))
}

/// 按关键字表推断部门（表顺序即优先级，未命中返回默认部门）
pub fn infer_department(
    nombre: &str,
    descripcion: &str,
    table: &[DepartmentKeywords],
    default_department: &str,
) -> String {
    let text = format!("{} {}", nombre, descripcion).to_lowercase();

    table
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| text.contains(k.as_str())))
        .map(|entry| entry.departamento.clone())
        .unwrap_or_else(|| default_department.to_string())
}

/// 随机 13 位数字条码
pub fn generate_barcode() -> String {
    rand::rng()
        .random_range(1_000_000_000_000u64..10_000_000_000_000u64)
        .to_string()
}

/// 由产品名生成 clave：最多 4 个词首字母 + "-" + 两位随机数
pub fn generate_clave(producto: &str) -> String {
    let initials: String = producto
        .trim()
        .split(' ')
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .take(4)
        .collect();
    let numero: u32 = rand::rng().random_range(1..=99);
    format!("{}-{:02}", initials, numero)
}

/// 部门默认销售单位
pub fn sale_unit(departamento: &str) -> String {
    sale_unit_for(departamento).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::import_settings::ImportSettings;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("PINZAS de CORTE"), "Pinzas De Corte");
        assert_eq!(title_case("ángulo"), "Ángulo");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_name_from_short_description() {
        let settings = ImportSettings::default();
        assert_eq!(
            name_from_description("Martillo de acero", "MART-01", &settings.stopwords),
            "Martillo De Acero"
        );
    }

    #[test]
    fn test_name_from_long_description_uses_significant_words() {
        let settings = ImportSettings::default();
        let name = name_from_description(
            "LLAVE ajustable de 10\" con mango, tipo cromo",
            "LL-10",
            &settings.stopwords,
        );
        assert_eq!(name, "Llave Ajustable Mango");
    }

    #[test]
    fn test_name_falls_back_to_clave() {
        let settings = ImportSettings::default();
        let name = name_from_description("de la 10 y 20 el", "PZ_TOR-3", &settings.stopwords);
        assert_eq!(name, "Pz Tor 3");
    }

    #[test]
    fn test_infer_department_first_match_wins() {
        let settings = ImportSettings::default();
        let table = &settings.department_keywords;

        // "llave" está en ferretería y plomería; ferretería aparece antes
        assert_eq!(infer_department("Llave", "", table, "ferreteria"), "ferreteria");
        assert_eq!(infer_department("Cable THW", "calibre 12", table, "ferreteria"), "electrico");
        assert_eq!(infer_department("Malla", "ciclón", table, "ferreteria"), "construccion");
        assert_eq!(infer_department("Pinzas", "Pinzas", table, "ferreteria"), "ferreteria");
        assert_eq!(infer_department("Xyz", "", table, "limpieza"), "limpieza");
    }

    #[test]
    fn test_generate_barcode_is_13_digits() {
        for _ in 0..50 {
            let code = generate_barcode();
            assert_eq!(code.len(), 13);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_clave_shape() {
        let clave = generate_clave("malla ciclón galvanizada calibre doce");
        let (initials, numero) = clave.split_once('-').unwrap();
        assert_eq!(initials, "MCGC");
        assert_eq!(numero.len(), 2);
        let n: u32 = numero.parse().unwrap();
        assert!((1..=99).contains(&n));
    }
}
