// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "redrix",
    about = "A chat relay client with remote-store persistence and local fallback",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// One-shot prompt: send a single message and print the reply
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Model to use, e.g. "llama-3.1-8b-instant"
    #[arg(long, short = 'M', env = "REDRIX_MODEL")]
    pub model: Option<String>,

    /// Explicit config file path (merged over the discovered layers)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Verbose logging (also honours REDRIX_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the completion API and the remote document store
    TestConnection,

    /// Write the full conversation history as a plain-text transcript
    Export {
        /// Output file; stdout when omitted
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Delete all stored conversation history
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },

    /// List the model catalog
    ListModels {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the merged configuration
    ShowConfig,
}
