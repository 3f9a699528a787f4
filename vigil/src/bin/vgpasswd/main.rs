/*
 *     Copyright 2026 The Vigil Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use termion::{color, style};
use tracing::{info, Level};
use vigil::passwd;
use vigil::tracing::init_tracing;
use vigil_config::vgpasswd;

#[derive(Debug, Parser)]
#[command(
    name = vgpasswd::NAME,
    author,
    version,
    about = "vgpasswd is a password policy validator",
    long_about = "A password policy validator that checks a candidate password against the \
    server password policy and reports every violated rule, prompting on stdin when no \
    password argument is given."
)]
struct Args {
    #[arg(help = "Specify the password to validate, prompting on stdin when omitted")]
    password: Option<String>,

    #[arg(
        short = 'l',
        long,
        default_value = "info",
        help = "Specify the logging level [trace, debug, info, warn, error]"
    )]
    log_level: Level,

    #[arg(
        long,
        default_value_os_t = vgpasswd::default_vgpasswd_log_dir(),
        help = "Specify the log directory"
    )]
    log_dir: PathBuf,

    #[arg(
        long,
        default_value_t = 6,
        help = "Specify the max number of log files"
    )]
    log_max_files: usize,

    #[arg(
        long = "verbose",
        default_value_t = false,
        help = "Specify whether to print log"
    )]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments.
    let args = Args::parse();

    // Initialize tracing.
    let _guards = init_tracing(
        vgpasswd::NAME,
        &args.log_dir,
        args.log_level,
        args.log_max_files,
        args.verbose,
    );

    println!("--- Password Policy Validator ---");
    println!(
        "Criteria: {}+ chars, Upper, Lower, Digit, Special Char",
        passwd::MIN_LENGTH
    );
    println!("{}", "-".repeat(40));

    let password = match args.password {
        Some(password) => password,
        None => {
            print!("Enter your password to validate: ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                println!();
                println!("Operation cancelled by user.");
                return Ok(());
            }

            line.trim_end_matches('\n').trim_end_matches('\r').to_string()
        }
    };

    let violations = passwd::validate(&password);
    if violations.is_empty() {
        info!("password accepted by policy");
        println!(
            "{}{}Success! Strong password.{}",
            color::Fg(color::Green),
            style::Bold,
            style::Reset
        );
        return Ok(());
    }

    info!("password rejected with {} violations", violations.len());
    println!(
        "{}{}Failed. Weak password.{}",
        color::Fg(color::Red),
        style::Bold,
        style::Reset
    );
    println!("Reasons:");
    for violation in violations.iter() {
        println!("  - {}", violation);
    }

    std::process::exit(1);
}
