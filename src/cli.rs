//! Command line parsing
//!
//! Arguments are few enough to parse by hand.

use std::path::PathBuf;

/// What the process was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send one chat completion and print the answer
    Invoke {
        model: Option<String>,
        prompt: Option<String>,
    },
    /// Run the merchant context pipeline over a text file
    Context {
        path: PathBuf,
        question: Option<String>,
    },
    Help,
}

/// Parse arguments, excluding the program name
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();

    if args.peek().map(String::as_str) == Some("context") {
        args.next();
        let mut path = None;
        let mut question = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--question" => question = Some(value_for(&arg, args.next())?),
                other if other.starts_with('-') => {
                    return Err(format!("Unknown option: {other}"));
                }
                _ if path.is_none() => path = Some(PathBuf::from(&arg)),
                other => return Err(format!("Unexpected argument: {other}")),
            }
        }
        let path = path.ok_or_else(|| "context requires a file path".to_string())?;
        return Ok(Command::Context { path, question });
    }

    let mut model = None;
    let mut prompt = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--model" => model = Some(value_for(&arg, args.next())?),
            "--prompt" => prompt = Some(value_for(&arg, args.next())?),
            other => return Err(format!("Unknown argument: {other}")),
        }
    }
    Ok(Command::Invoke { model, prompt })
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, String> {
    value
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| format!("{flag} requires a value"))
}
