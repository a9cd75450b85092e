use crate::error::TabcalcResult;
use crate::types::Calculator;
use std::fs;
use std::path::Path;

/// Serialized calculator format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension (`.yaml`/`.yml`, anything else is JSON)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Render a calculator as pretty JSON
pub fn to_json(calculator: &Calculator) -> TabcalcResult<String> {
    let mut json = serde_json::to_string_pretty(calculator)?;
    json.push('\n');
    Ok(json)
}

/// Render a calculator as YAML
pub fn to_yaml(calculator: &Calculator) -> TabcalcResult<String> {
    Ok(serde_yaml::to_string(calculator)?)
}

pub fn render(calculator: &Calculator, format: DocumentFormat) -> TabcalcResult<String> {
    match format {
        DocumentFormat::Json => to_json(calculator),
        DocumentFormat::Yaml => to_yaml(calculator),
    }
}

/// Write a calculator to disk, format chosen by extension
pub fn write_calculator(path: &Path, calculator: &Calculator) -> TabcalcResult<()> {
    let content = render(calculator, DocumentFormat::from_path(path))?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use tempfile::TempDir;

    fn sample() -> Calculator {
        let mut calculator = Calculator::new("Tank", "Cylinder volume");
        calculator
            .cells
            .push(Cell::input("diametre".into(), "Diamètre".into(), 6.0, "m".into(), 1.0));
        calculator.cells.push(Cell::formula(
            "surface".into(),
            "Surface".into(),
            "Math.PI * diametre ** 2".into(),
            "m²".into(),
            2,
        ));
        calculator
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a")), DocumentFormat::Json);
    }

    #[test]
    fn test_json_shape() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["name"], "Tank");
        assert_eq!(value["cells"][0]["kind"], "input");
        assert_eq!(value["cells"][1]["kind"], "formula");
        assert_eq!(value["cells"][1]["decimals"], 2);
        assert!(value["cells"][0].get("expression").is_none());
        assert!(value["cells"][1].get("value").is_none());
    }

    #[test]
    fn test_yaml_output() {
        let yaml = to_yaml(&sample()).unwrap();
        assert!(yaml.contains("kind: input"));
        assert!(yaml.contains("Math.PI * diametre ** 2"));
        assert!(!yaml.contains("null"));
    }

    #[test]
    fn test_write_calculator_by_extension() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("calc.json");
        let yaml_path = dir.path().join("calc.yaml");

        write_calculator(&json_path, &sample()).unwrap();
        write_calculator(&yaml_path, &sample()).unwrap();

        let json = fs::read_to_string(&json_path).unwrap();
        let yaml = fs::read_to_string(&yaml_path).unwrap();
        assert!(json.trim_start().starts_with('{'));
        assert!(yaml.starts_with("name: Tank"));
    }
}
