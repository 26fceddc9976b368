//! csgraph - graphic score definition checker and formatter
//!
//! # Usage
//!
//! ```bash
//! csgraph score.csg                  # print canonical source
//! csgraph score.csg --check          # validate only
//! csgraph score.csg --frame > a.svg  # wrap output in the document frame
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use csgraph::{
    definitions::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH},
    dsl,
    error::Result,
    FrameConfig, ParserConfig,
};

/// Parse and format csgraph instrument definitions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the score definition file (.csg)
    #[arg(value_name = "SCORE_FILE")]
    score_file: PathBuf,

    /// Only check the file for syntax errors
    #[arg(long)]
    check: bool,

    /// Reject converter names outside the Csound vocabulary
    #[arg(long)]
    strict_converters: bool,

    /// Wrap the output in the document header and trailer
    #[arg(long)]
    frame: bool,

    /// Frame width
    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH)]
    width: u32,

    /// Frame height
    #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT)]
    height: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ParserConfig::new();
    if args.strict_converters {
        config = config.strict();
    }

    // Parse the score file
    let defs = dsl::parse_file(&args.score_file, &config)?;
    if args.check {
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.frame {
        let frame = FrameConfig::new()
            .with_size(args.width, args.height)
            .with_title(args.score_file.display().to_string());
        defs.header_with(&frame, &mut out)?;
        write!(out, "<!--\n{}-->\n", defs.to_source())?;
        defs.trailer(&mut out)?;
    } else {
        write!(out, "{}", defs.to_source())?;
    }
    out.flush()?;

    Ok(())
}
