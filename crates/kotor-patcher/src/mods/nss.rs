//! Compiling script sources with memory tokens filled in.
//!
//! Script sources may contain `#2DAMEMORY<n>#` and `#StrRef<n>#` placeholders. They are
//! replaced with the token values before the source is handed to a [`ScriptCompiler`].

use super::PatchTarget;
use crate::{PatchError, PatchLogger, PatcherMemory, Result, TokenId};
use kotor_support::decode_str;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{map, map_res},
    sequence::{delimited, preceded},
    IResult,
};

/// Turns script source into compiled bytecode.
pub trait ScriptCompiler {
    /// Compile the script `name` from `source`, returning the compiled `.ncs` bytes.
    fn compile(
        &self,
        name: &str,
        source: &str,
    ) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> ScriptCompiler for F
where
    F: Fn(&str, &str) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>,
{
    fn compile(
        &self,
        name: &str,
        source: &str,
    ) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        self(name, source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Memory2DA(TokenId),
    MemoryStr(TokenId),
}

fn parse_number(input: &str) -> IResult<&str, TokenId> {
    map_res(digit1, |digits: &str| digits.parse::<TokenId>())(input)
}

/// Eat a `#2DAMEMORY<n>#` or `#StrRef<n>#` placeholder.
fn parse_token(input: &str) -> IResult<&str, Token> {
    delimited(
        tag("#"),
        alt((
            map(preceded(tag("2DAMEMORY"), parse_number), Token::Memory2DA),
            map(preceded(tag("StrRef"), parse_number), Token::MemoryStr),
        )),
        tag("#"),
    )(input)
}

/// Replace every memory placeholder in `source` with its token value.
pub fn substitute_tokens(source: &str, memory: &PatcherMemory) -> Result<String> {
    let mut output = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(position) = rest.find('#') {
        output.push_str(&rest[..position]);
        rest = &rest[position..];
        match parse_token(rest) {
            Ok((remaining, Token::Memory2DA(token))) => {
                output.push_str(memory.get_2da(token)?);
                rest = remaining;
            }
            Ok((remaining, Token::MemoryStr(token))) => {
                output.push_str(&memory.get_str(token)?.to_string());
                rest = remaining;
            }
            Err(_) => {
                output.push('#');
                rest = &rest[1..];
            }
        }
    }
    output.push_str(rest);
    Ok(output)
}

fn ncs_name(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(dot) => &filename[..dot],
        None => filename,
    };
    format!("{}.ncs", stem)
}

/// A script to compile and install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationsNss {
    /// The `.nss` source file, and the `.ncs` name it is saved as.
    pub target: PatchTarget,
}

impl ModificationsNss {
    /// Compile `filename`, saving the result with an `.ncs` extension.
    pub fn new(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let saveas = ncs_name(&filename);
        Self {
            target: PatchTarget::new(filename).save_as(saveas),
        }
    }

    /// Fill in the placeholders of `source` and compile it.
    pub fn apply(
        &self,
        source: &[u8],
        memory: &PatcherMemory,
        compiler: &dyn ScriptCompiler,
        logger: &mut PatchLogger,
    ) -> Result<Vec<u8>> {
        let source = substitute_tokens(&decode_str(source)?, memory)?;
        logger.add_note(format!("Compiling '{}'", self.target.sourcefile));
        compiler
            .compile(&self.target.sourcefile, &source)
            .map_err(|err| PatchError::Compile(self.target.sourcefile.clone(), err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> PatcherMemory {
        let mut memory = PatcherMemory::new();
        memory.set_2da(1, "42");
        memory.set_str(12, 1337);
        memory
    }

    #[test]
    fn substitute() {
        let source = "int a = #2DAMEMORY1#; int b = #StrRef12#; // #notatoken# #2DAMEMORY#";
        assert_eq!(
            substitute_tokens(source, &memory()).unwrap(),
            "int a = 42; int b = 1337; // #notatoken# #2DAMEMORY#"
        );
    }

    #[test]
    fn adjacent_tokens() {
        assert_eq!(
            substitute_tokens("##2DAMEMORY1##StrRef12##", &memory()).unwrap(),
            "#421337#"
        );
    }

    #[test]
    fn missing_token() {
        assert!(matches!(
            substitute_tokens("#2DAMEMORY9#", &memory()),
            Err(PatchError::MissingToken2DA(9))
        ));
    }

    #[test]
    fn compile_with_closure() {
        let patch = ModificationsNss::new("k_inc_mod.nss");
        assert_eq!(patch.target.saveas, "k_inc_mod.ncs");

        let compiler = |_: &str, source: &str| -> std::result::Result<
            Vec<u8>,
            Box<dyn std::error::Error + Send + Sync>,
        > { Ok(source.as_bytes().to_vec()) };
        let mut logger = PatchLogger::new();
        let compiled = patch
            .apply(b"x = #StrRef12#;", &memory(), &compiler, &mut logger)
            .unwrap();
        assert_eq!(compiled, b"x = 1337;");
    }

    #[test]
    fn compile_errors() {
        let patch = ModificationsNss::new("broken.nss");
        let compiler = |_: &str, _: &str| -> std::result::Result<
            Vec<u8>,
            Box<dyn std::error::Error + Send + Sync>,
        > { Err("syntax error".into()) };
        let mut logger = PatchLogger::new();
        let err = patch
            .apply(b"void main() {", &memory(), &compiler, &mut logger)
            .unwrap_err();
        assert!(matches!(err, PatchError::Compile(name, message) if name == "broken.nss" && message == "syntax error"));
    }
}
