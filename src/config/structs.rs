use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - database: 数据库连接与重试
/// - logging: 日志输出
/// - engagement: 合并窗口、统计窗口、推荐候选池
/// - analytics: 推荐点击率统计
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：RP，分隔符：__
    /// 示例：RP__ENGAGEMENT__MERGE_WINDOW_SECS=120
    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("RP")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 阅读行为与推荐配置
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// 同一 (reader, article, kind) 在该窗口内的信号合并为一条记录
    #[serde(default = "default_merge_window_secs")]
    pub merge_window_secs: u64,
    /// top_categories 使用的统计窗口（天）
    #[serde(default = "default_stats_window_days")]
    pub stats_window_days: u32,
    /// 推荐时参与筛选的分类数
    #[serde(default = "default_category_pool")]
    pub category_pool: usize,
    /// 候选数 = limit * multiplier（排除已读后仍有余量）
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,
}

/// 推荐点击率统计配置
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_window_days")]
    pub default_window_days: u32,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_database_url() -> String {
    "readpulse.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_merge_window_secs() -> u64 {
    300
}

fn default_stats_window_days() -> u32 {
    30
}

fn default_category_pool() -> usize {
    10
}

fn default_candidate_multiplier() -> usize {
    3
}

fn default_candidate_cap() -> usize {
    600
}

fn default_analytics_window_days() -> u32 {
    7
}

// ============================================================
// Default implementations
// ============================================================

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            merge_window_secs: default_merge_window_secs(),
            stats_window_days: default_stats_window_days(),
            category_pool: default_category_pool(),
            candidate_multiplier: default_candidate_multiplier(),
            candidate_cap: default_candidate_cap(),
        }
    }
}

impl EngagementConfig {
    pub fn merge_window(&self) -> chrono::Duration {
        let secs = i64::try_from(self.merge_window_secs).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_window_days: default_analytics_window_days(),
        }
    }
}
