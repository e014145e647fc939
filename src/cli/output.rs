//! Output formatting for CLI commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::args::{ApprecArgs, OutputFormat};
use crate::error::Result;

/// Result structure for classifier training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub model_path: String,
    pub items: usize,
    pub labels: Vec<String>,
    pub tags: usize,
    pub terms: usize,
}

impl fmt::Display for TrainingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model:    {}", self.model_path)?;
        writeln!(f, "Items:    {}", self.items)?;
        writeln!(f, "Labels:   {}", self.labels.join(", "))?;
        writeln!(f, "Features: {} tags, {} terms", self.tags, self.terms)
    }
}

/// One classified package.
#[derive(Debug, Serialize, Deserialize)]
pub struct Classification {
    pub package: String,
    pub label: String,
}

/// Result structure for classification.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassificationResults {
    pub classifications: Vec<Classification>,
}

impl fmt::Display for ClassificationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.classifications {
            writeln!(f, "{:<30} {}", c.package, c.label)?;
        }
        Ok(())
    }
}

/// Result structure for dataset verification.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub dir: String,
    pub clusters: usize,
    pub packages: usize,
}

impl fmt::Display for VerificationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} clusters over {} packages",
            self.dir, self.clusters, self.packages
        )
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + fmt::Display>(
    message: &str,
    result: &T,
    args: &ApprecArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: fmt::Display>(message: &str, result: &T, args: &ApprecArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }
    print!("{result}");
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &ApprecArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}
