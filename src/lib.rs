// ==========================================
// 设备维护管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (键值快照) + tokio
// 系统定位: 设备 / 干预 / 备件数据源 + 维护指标引擎
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 键值持久化与实体集合
pub mod repository;

// 引擎层 - 指标计算（纯函数）
pub mod engine;

// 模拟数据生成
pub mod generator;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装与轮询刷新
pub mod app;

// CSV 导出
pub mod export;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CriticalityLevel, DisplayStatus, EquipmentStatus, IndicatorGrade, InterventionStatus,
    InterventionType, Priority,
};

// 领域实体
pub use domain::{
    DashboardStats, Equipment, EquipmentIndicators, Intervention, MetricValue, ParetoItem,
    PerformanceMetrics, SparePart,
};

// 引擎
pub use engine::{DashboardEngine, EventStatusEngine, ParetoEngine, ReliabilityEngine};

// API
pub use api::{DashboardApi, EquipmentApi, InterventionApi, SparePartApi};

// 应用
pub use app::{AppState, DashboardRefresher};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备维护管理系统";
