use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use formtool::{
    ctx::{AppContext, PathConfig},
    form::FormCommandHandler,
    utils::Assignment,
};

#[derive(Parser)]
#[command(name = "formtool", version, about = "Render, validate and submit schema-driven forms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the form as text
    Render {
        #[command(flatten)]
        form: FormArgs,
        /// Validate every field first so all errors are shown
        #[arg(long)]
        validate: bool,
    },
    /// Validate the whole form; exits non-zero when invalid
    Check {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Validate, coerce and write the submitted values
    Submit {
        #[command(flatten)]
        form: FormArgs,
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the raw values without validation
    Draft {
        #[command(flatten)]
        form: FormArgs,
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FormArgs {
    /// Form template (`.json` or `.toml`)
    template: PathBuf,
    /// Saved values layered over the template data
    #[arg(short, long)]
    data: Option<PathBuf>,
    /// Field input, may be repeated
    #[arg(short, long = "set", value_name = "NAME=VALUE")]
    set: Vec<Assignment>,
}

impl FormArgs {
    fn context(self, output: Option<PathBuf>) -> anyhow::Result<AppContext> {
        let mut ctx = AppContext::load(PathConfig {
            template: self.template,
            data: self.data,
            output,
        })?;
        ctx.apply(&self.set)?;
        Ok(ctx)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { form, validate } => {
            let mut ctx = form.context(None)?;
            FormCommandHandler::handle_render(&mut ctx, validate)?;
        }
        Commands::Check { form } => {
            let mut ctx = form.context(None)?;
            FormCommandHandler::handle_check(&mut ctx)?;
        }
        Commands::Submit { form, output } => {
            let mut ctx = form.context(output)?;
            FormCommandHandler::handle_submit(&mut ctx).await?;
        }
        Commands::Draft { form, output } => {
            let mut ctx = form.context(output)?;
            FormCommandHandler::handle_draft(&mut ctx).await?;
        }
    }

    Ok(())
}
