// crates/sw_workflow/src/flow.rs

//! 入口流动量推导
//!
//! 由雷诺数、运动粘度、水力直径和湍流强度得到入口速度与湍流量：
//!
//! ```text
//! U = Re·ν / d_h
//! k = 1.5·(U·I)²
//! ε = C_μ^(3/4) · k^(3/2) / (0.07·d_h)
//! ω = ε / k
//! ```
//!
//! 全部为纯函数，双精度计算，不做截断。

use serde::{Deserialize, Serialize};
use sw_config::SweepConfig;

/// 湍流模型常数 C_μ
pub const C_MU: f64 = 0.09;

/// 湍流长度尺度与水力直径之比
pub const LENGTH_SCALE_RATIO: f64 = 0.07;

/// 入口速度 U = Re·ν / d_h
pub fn inlet_velocity(reynolds: f64, nu: f64, hydraulic_diameter: f64) -> f64 {
    reynolds * nu / hydraulic_diameter
}

/// 湍动能 k = 1.5·(U·I)²
pub fn turbulent_kinetic_energy(velocity: f64, intensity: f64) -> f64 {
    1.5 * (velocity * intensity).powi(2)
}

/// 耗散率 ε = C_μ^(3/4)·k^(3/2) / (0.07·d_h)
pub fn dissipation_rate(k: f64, hydraulic_diameter: f64) -> f64 {
    C_MU.powf(3.0 / 4.0) * k.powf(3.0 / 2.0) / (LENGTH_SCALE_RATIO * hydraulic_diameter)
}

/// 比耗散率 ω = ε / k
pub fn specific_dissipation_rate(epsilon: f64, k: f64) -> f64 {
    epsilon / k
}

/// 某一雷诺数下的入口流动量
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFlow {
    /// 雷诺数
    pub reynolds: u32,
    /// 入口速度 [m/s]
    pub velocity: f64,
    /// 湍动能 [m²/s²]
    pub k: f64,
    /// 耗散率 [m²/s³]
    pub epsilon: f64,
    /// 比耗散率 [1/s]
    pub omega: f64,
}

impl DerivedFlow {
    /// 计算入口流动量
    pub fn compute(reynolds: u32, nu: f64, hydraulic_diameter: f64, intensity: f64) -> Self {
        let velocity = inlet_velocity(f64::from(reynolds), nu, hydraulic_diameter);
        let k = turbulent_kinetic_energy(velocity, intensity);
        let epsilon = dissipation_rate(k, hydraulic_diameter);
        Self {
            reynolds,
            velocity,
            k,
            epsilon,
            omega: specific_dissipation_rate(epsilon, k),
        }
    }

    /// 使用配置中的物性参数
    pub fn from_config(config: &SweepConfig, reynolds: u32) -> Self {
        Self::compute(
            reynolds,
            config.kinematic_viscosity,
            config.hydraulic_diameter,
            config.turbulence_intensity,
        )
    }
}
