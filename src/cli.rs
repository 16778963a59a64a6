use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// 命令行参数，覆盖环境变量中的同名配置
#[derive(Debug, Parser)]
#[command(
    name = "course_capture",
    version,
    about = "登录课程平台，把每个课时整页截图并合成 PDF"
)]
pub struct Cli {
    /// 课程 URL（默认读取 COURSE_URL）
    pub course_url: Option<String>,

    /// 同时截图的课时数量
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// 输出根目录
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 显示浏览器窗口（手动登录 / 输入验证码时使用）
    #[arg(long)]
    pub headed: bool,

    /// 站点配置文件（TOML）
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// 输出 debug 日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 把命令行参数写入配置
    pub fn apply(self, config: &mut Config) {
        if let Some(url) = self.course_url {
            config.course_url = url;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrent_lessons = concurrency.max(1);
        }
        if let Some(output) = self.output {
            // cookie 文件仍在默认位置时跟随输出目录
            if config.cookies_file == config.output_dir.join("cookies.json") {
                config.cookies_file = output.join("cookies.json");
            }
            config.output_dir = output;
        }
        if self.headed {
            config.headless = false;
        }
        if let Some(profile) = self.profile {
            config.site_profile = Some(profile);
        }
        if self.verbose {
            config.verbose_logging = true;
        }
    }
}
