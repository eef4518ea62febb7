// crates/sw_case/src/types.rs

//! 算例领域枚举
//!
//! 湍流类型、分解方法和湍流场名，均可从求解器字典中使用的字符串解析。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CaseError;

/// 湍流模拟类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurbulenceType {
    /// 层流
    #[serde(rename = "laminar")]
    Laminar,
    /// 雷诺平均
    #[serde(rename = "RAS")]
    Ras,
}

impl TurbulenceType {
    /// 字典中的写法
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Laminar => "laminar",
            Self::Ras => "RAS",
        }
    }

    /// `turbulence` 开关值
    pub fn switch(&self) -> &'static str {
        match self {
            Self::Laminar => "off",
            Self::Ras => "on",
        }
    }
}

impl fmt::Display for TurbulenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TurbulenceType {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "laminar" => Ok(Self::Laminar),
            "RAS" => Ok(Self::Ras),
            other => Err(CaseError::UnsupportedTurbulence {
                value: other.to_string(),
            }),
        }
    }
}

/// 网格分解方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionMethod {
    /// 按坐标方向均分
    Simple,
    /// 图划分
    Scotch,
    /// 分层坐标划分
    Hierarchical,
}

impl DecompositionMethod {
    /// 字典中的写法
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Scotch => "scotch",
            Self::Hierarchical => "hierarchical",
        }
    }

    /// 系数子块名称，scotch 无系数块
    pub fn coeffs_block(&self) -> Option<&'static str> {
        match self {
            Self::Simple => Some("simpleCoeffs"),
            Self::Scotch => None,
            Self::Hierarchical => Some("hierarchicalCoeffs"),
        }
    }

    /// 是否使用 `n` 系数元组
    pub fn uses_coeffs(&self) -> bool {
        self.coeffs_block().is_some()
    }
}

impl fmt::Display for DecompositionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecompositionMethod {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "scotch" => Ok(Self::Scotch),
            "hierarchical" => Ok(Self::Hierarchical),
            other => Err(CaseError::UnknownMethod {
                value: other.to_string(),
            }),
        }
    }
}

/// 入口边界上设置的湍流场
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurbulenceField {
    /// 湍动能 k
    K,
    /// 耗散率 ε
    Epsilon,
    /// 比耗散率 ω
    Omega,
}

impl TurbulenceField {
    /// 初始场文件名
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::K => "k",
            Self::Epsilon => "epsilon",
            Self::Omega => "omega",
        }
    }
}

impl fmt::Display for TurbulenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for TurbulenceField {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "k" => Ok(Self::K),
            "epsilon" => Ok(Self::Epsilon),
            "omega" => Ok(Self::Omega),
            other => Err(CaseError::UnknownField {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turbulence_type_parse() {
        assert_eq!("laminar".parse::<TurbulenceType>().unwrap(), TurbulenceType::Laminar);
        assert_eq!("RAS".parse::<TurbulenceType>().unwrap(), TurbulenceType::Ras);
        assert!(matches!(
            "LES".parse::<TurbulenceType>(),
            Err(CaseError::UnsupportedTurbulence { .. })
        ));
        assert_eq!(TurbulenceType::Ras.switch(), "on");
        assert_eq!(TurbulenceType::Laminar.switch(), "off");
    }

    #[test]
    fn test_method_coeffs_block() {
        assert_eq!(DecompositionMethod::Simple.coeffs_block(), Some("simpleCoeffs"));
        assert_eq!(DecompositionMethod::Hierarchical.coeffs_block(), Some("hierarchicalCoeffs"));
        assert!(!DecompositionMethod::Scotch.uses_coeffs());
        assert!("metis".parse::<DecompositionMethod>().is_err());
    }

    #[test]
    fn test_field_names() {
        assert_eq!("epsilon".parse::<TurbulenceField>().unwrap(), TurbulenceField::Epsilon);
        assert_eq!(TurbulenceField::Omega.file_name(), "omega");
        assert!("nut".parse::<TurbulenceField>().is_err());
    }
}
