use parg::{Arity, Event, LongOption, ParseState};
use tracing::debug;

use crate::error::{Result, SimpleError};

/// Short grammar; the leading `:` asks for `MissingValue` reports.
pub const OPTSTRING: &str = ":hvo:s::";

const HELP: i32 = 'h' as i32;
const VERBOSE: i32 = 'v' as i32;
const OUTPUT: i32 = 'o' as i32;
const SIZE: i32 = 's' as i32;

/// `--size` given without a value.
const DEFAULT_SIZE: i32 = 1;

pub fn long_options() -> [LongOption<'static>; 4] {
    [
        LongOption::new("help", Arity::None, HELP),
        LongOption::new("verbose", Arity::None, VERBOSE),
        LongOption::new("output", Arity::Required, OUTPUT),
        LongOption::new("size", Arity::Optional, SIZE),
    ]
}

pub fn usage(exe: &str) -> String {
    format!(
        "Usage: {} [options] [args...]\n\
         \n\
         Options:\n  \
         -h, --help            Show this help message\n  \
         -v, --verbose         Increase verbosity (repeatable)\n  \
         -o, --output FILE     Output file\n  \
         -s, --size[=N]        Optional size (default 1 if set)\n",
        exe
    )
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Cmdline<'a> {
    pub help: bool,
    pub verbose: u32,
    pub output: Option<&'a str>,
    pub size: i32,
    pub args: Vec<&'a str>,
}

/// Parse `argv` (program name included). Parsing stops at `--help`.
pub fn parse_args<'a, S: AsRef<str>>(argv: &'a [S]) -> Result<Cmdline<'a>> {
    let longopts = long_options();
    let mut cmdline = Cmdline::default();
    let mut ps = ParseState::new();

    loop {
        let event = ps.getopt_long(argv, OPTSTRING, Some(&longopts), None);
        debug!(?event, next_index = ps.next_index(), "parsed");

        match event {
            Event::End => break,
            Event::Positional(arg) => cmdline.args.push(arg),
            Event::Opt { code: HELP, .. } => {
                cmdline.help = true;
                return Ok(cmdline);
            }
            Event::Opt { code: VERBOSE, .. } => cmdline.verbose += 1,
            Event::Opt { code: OUTPUT, value } => cmdline.output = value,
            Event::Opt { code: SIZE, value } => {
                cmdline.size = match value {
                    Some(text) => parse_nonnegative_int(text)
                        .ok_or_else(|| SimpleError::InvalidSize(text.to_string()))?,
                    None => DEFAULT_SIZE,
                };
            }
            Event::Unknown(0) => {
                let token = ps
                    .next_index()
                    .checked_sub(1)
                    .and_then(|i| argv.get(i))
                    .map_or("(unknown)", |arg| arg.as_ref());
                return Err(SimpleError::UnknownLongOption(token.to_string()));
            }
            Event::Unknown(code) => {
                return Err(SimpleError::UnknownOption(code_char(code)));
            }
            Event::MissingValue(code) => {
                let option = match find_long_name(&longopts, code) {
                    Some(name) => format!("--{}", name),
                    None => format!("-{}", code_char(code)),
                };
                return Err(SimpleError::MissingValue(option));
            }
            Event::Opt { code, .. } => return Err(SimpleError::Unexpected(code)),
            Event::FlagSet => return Err(SimpleError::Unexpected(0)),
        }
    }

    // Everything after `--` is an operand
    if let Some(rest) = argv.get(ps.next_index()..) {
        cmdline.args.extend(rest.iter().map(|arg| arg.as_ref()));
    }

    Ok(cmdline)
}

fn code_char(code: i32) -> char {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Long name reporting `code` directly (entries with a flag cell never do).
fn find_long_name<'a>(longopts: &[LongOption<'a>], code: i32) -> Option<&'a str> {
    longopts
        .iter()
        .find(|opt| opt.flag.is_none() && opt.val == code)
        .map(|opt| opt.name)
}

/// Accepts an optional leading `+`; surrounding whitespace is rejected.
fn parse_nonnegative_int(text: &str) -> Option<i32> {
    text.parse::<i32>().ok().filter(|n| *n >= 0)
}
