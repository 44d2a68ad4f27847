use serde::{Deserialize, Serialize};

/// Built-in header sets. `Zh` matches the hospital worksheets the tool was
/// first written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderPreset {
    #[default]
    En,
    Zh,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnNames {
    pub procedure_code: String,
    pub diagnosis_name: String,
    pub wound_category: String,
    pub ratio: String,
}

impl ColumnNames {
    pub fn preset(preset: HeaderPreset) -> Self {
        match preset {
            HeaderPreset::En => Self {
                procedure_code: "procedure_code".to_string(),
                diagnosis_name: "diagnosis_name".to_string(),
                wound_category: "wound_category".to_string(),
                ratio: "wound_category_ratio".to_string(),
            },
            HeaderPreset::Zh => Self {
                procedure_code: "手术编码".to_string(),
                diagnosis_name: "诊断名称".to_string(),
                wound_category: "切口类别".to_string(),
                ratio: "切口类别比例".to_string(),
            },
        }
    }

    pub fn with_overrides(
        mut self,
        procedure_code: Option<&str>,
        diagnosis_name: Option<&str>,
        wound_category: Option<&str>,
        ratio: Option<&str>,
    ) -> Self {
        if let Some(name) = procedure_code {
            self.procedure_code = name.to_string();
        }
        if let Some(name) = diagnosis_name {
            self.diagnosis_name = name.to_string();
        }
        if let Some(name) = wound_category {
            self.wound_category = name.to_string();
        }
        if let Some(name) = ratio {
            self.ratio = name.to_string();
        }
        self
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self::preset(HeaderPreset::En)
    }
}
