//! tracing 기반 로깅 초기화.
//!
//! 출력 형식은 `pretty`(개발), `json`(로그 수집), `compact`(한 줄) 세 가지입니다.
//! 비밀번호 평문과 해시는 어떤 레벨에서도 기록하지 않습니다.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("Unknown log format: {other} (pretty | json | compact)")),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` 지시어 (예: "info", "user_api=debug,tower_http=info")
    pub level: String,
    pub format: LogFormat,
    /// HTTP span의 생성/종료를 이벤트로 기록
    pub span_events: bool,
    /// 파일명과 줄 번호 표시
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            span_events: false,
            source_location: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// `[logging]` 설정 섹션에서 생성합니다.
    ///
    /// `RUST_LOG`와 `LOG_FORMAT` 환경 변수가 설정 파일 값보다 우선합니다.
    /// 알 수 없는 형식 이름은 `pretty`로 처리합니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self::resolve(
            settings,
            std::env::var("RUST_LOG").ok(),
            std::env::var("LOG_FORMAT").ok(),
        )
    }

    fn resolve(
        settings: &LoggingConfig,
        level_override: Option<String>,
        format_override: Option<String>,
    ) -> Self {
        let format = format_override
            .as_deref()
            .unwrap_or(&settings.format)
            .parse()
            .unwrap_or_default();

        Self {
            level: level_override.unwrap_or_else(|| settings.level.clone()),
            format,
            // 운영(JSON) 로그에는 위치 정보를 함께 남김
            source_location: format == LogFormat::Json,
            ..Default::default()
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let base = fmt::layer()
            .with_file(self.source_location)
            .with_line_number(self.source_location)
            .with_span_events(span_events);

        match self.format {
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Json => base.json().flatten_event(true).boxed(),
            LogFormat::Compact => base.compact().boxed(),
        }
    }
}

/// 전역 subscriber를 설치합니다. 프로세스당 한 번만 호출할 수 있습니다.
///
/// ```no_run
/// use user_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("debug").with_format(LogFormat::Json))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(&config.level)?;

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(filter)
        .try_init()?;

    tracing::info!(format = ?config.format, level = %config.level, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(level: &str, format: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: format.to_string(),
        }
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!(" JSON ".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("compact".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_resolve_uses_file_settings() {
        let config = LogConfig::resolve(&settings("warn", "json"), None, None);

        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.source_location);
    }

    #[test]
    fn test_resolve_env_overrides_win() {
        let config = LogConfig::resolve(
            &settings("warn", "json"),
            Some("user_api=debug".to_string()),
            Some("compact".to_string()),
        );

        assert_eq!(config.level, "user_api=debug");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(!config.source_location);
    }

    #[test]
    fn test_resolve_unknown_format_falls_back_to_pretty() {
        let config = LogConfig::resolve(&settings("info", "xml"), None, None);
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_builder() {
        let config = LogConfig::new("debug")
            .with_format(LogFormat::Json)
            .with_span_events(true);

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.span_events);
    }
}
