//! 사용자 서비스 관리 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 비밀번호 해시 생성
//! userctl hash-password --password 'correct horse'
//!
//! # 관리자 계정 생성
//! userctl create-user --email root@example.com --name Root --password '...' --role Admin
//!
//! # 토큰 검사
//! userctl inspect-token --token eyJhbGciOi...
//! ```

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;
use user_core::{AppConfig, Role};

use user_cli::commands::create_user::{create_user, CreateUserConfig};
use user_cli::commands::hash_password::hash_password;
use user_cli::commands::inspect_token::{inspect_token, render_claims};

#[derive(Parser)]
#[command(name = "userctl")]
#[command(about = "User service CLI - 계정 및 토큰 관리 도구", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (환경 변수 USERSVC__* 가 우선)
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 비밀번호의 Argon2id PHC 해시 출력
    HashPassword {
        /// 해시할 비밀번호
        #[arg(short, long)]
        password: String,
    },

    /// 계정 생성 (관리자 계정은 이 명령으로만 생성 가능)
    CreateUser {
        /// 이메일
        #[arg(short, long)]
        email: String,

        /// 표시 이름
        #[arg(short, long)]
        name: String,

        /// 비밀번호
        #[arg(short, long)]
        password: String,

        /// 역할 (User, Admin)
        #[arg(short, long, default_value = "User")]
        role: Role,

        /// 데이터베이스 URL (기본: 설정의 database.url)
        #[arg(long)]
        db_url: Option<String>,
    },

    /// 토큰을 검증하고 클레임 출력
    InspectToken {
        /// 검사할 토큰
        #[arg(short, long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // 로그는 stderr로 (stdout은 명령 결과 전용)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "user_cli=info,user_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::HashPassword { password } => {
            let hash = hash_password(&config.password, &password)?;
            println!("{}", hash);
        }

        Commands::CreateUser {
            email,
            name,
            password,
            role,
            db_url,
        } => {
            let request = CreateUserConfig {
                email,
                display_name: name,
                password,
                role,
                db_url,
            };

            match create_user(&config, request).await {
                Ok(profile) => {
                    println!("{}", serde_json::to_string_pretty(&profile)?);
                }
                Err(e) => {
                    error!("Create user failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::InspectToken { token } => {
            let claims = inspect_token(&config.jwt, &token)?;
            println!("{}", render_claims(&claims)?);
        }
    }

    Ok(())
}
