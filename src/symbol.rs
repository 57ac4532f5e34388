use serde::Serialize;
use std::fmt;
use std::io::Write;

use crate::classfile::ClassDescriptor;
use crate::cli::ReportFormat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SymbolLine {
    Class {
        owner: String,
    },
    Method {
        owner: String,
        name: String,
        descriptor: String,
    },
    Field {
        owner: String,
        name: String,
        descriptor: String,
    },
}

impl fmt::Display for SymbolLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { owner } => write!(f, "class: {owner}"),
            Self::Method {
                owner,
                name,
                descriptor,
            } => write!(f, "method: {owner}.{name}{descriptor}"),
            Self::Field {
                owner,
                name,
                descriptor,
            } => write!(f, "field: {owner}.{name}:{descriptor}"),
        }
    }
}

/// Class line first, then every method, then every field, each in file order.
pub fn symbol_lines(class: &ClassDescriptor) -> Vec<SymbolLine> {
    let owner = &class.internal_name;
    let mut lines = Vec::with_capacity(1 + class.methods.len() + class.fields.len());
    lines.push(SymbolLine::Class {
        owner: owner.clone(),
    });
    lines.extend(class.methods.iter().map(|m| SymbolLine::Method {
        owner: owner.clone(),
        name: m.name.clone(),
        descriptor: m.descriptor.clone(),
    }));
    lines.extend(class.fields.iter().map(|f| SymbolLine::Field {
        owner: owner.clone(),
        name: f.name.clone(),
        descriptor: f.descriptor.clone(),
    }));
    lines
}

/// Writes each line newline-terminated in the requested format.
pub fn write_lines<W: Write>(
    out: &mut W,
    lines: &[SymbolLine],
    format: ReportFormat,
) -> std::io::Result<()> {
    for line in lines {
        match format {
            ReportFormat::Text => writeln!(out, "{line}")?,
            ReportFormat::Json => {
                serde_json::to_writer(&mut *out, line)?;
                out.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
