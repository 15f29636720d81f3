//! MySQL `SELECT ... INTO`.

use std::fmt::Write as _;

use crate::error::Result;
use crate::expression::{Expression, SqlWriter};
use crate::value::Arg;

/// Options of `FIELDS`/`COLUMNS` in `INTO OUTFILE`.
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    /// `TERMINATED BY`.
    pub terminated_by: Option<String>,
    /// `[OPTIONALLY] ENCLOSED BY`.
    pub enclosed_by: Option<String>,
    /// Whether `ENCLOSED BY` is optional.
    pub optionally_enclosed: bool,
    /// `ESCAPED BY`.
    pub escaped_by: Option<String>,
}

impl FieldOptions {
    fn is_empty(&self) -> bool {
        self.terminated_by.is_none() && self.enclosed_by.is_none() && self.escaped_by.is_none()
    }
}

/// Options of `LINES` in `INTO OUTFILE`.
#[derive(Debug, Clone, Default)]
pub struct LineOptions {
    /// `STARTING BY`.
    pub starting_by: Option<String>,
    /// `TERMINATED BY`.
    pub terminated_by: Option<String>,
}

/// Target of `SELECT ... INTO`.
#[derive(Debug, Clone)]
pub enum IntoTarget {
    /// `INTO @a, @b`.
    Variables(Vec<String>),
    /// `INTO DUMPFILE 'file'`.
    Dumpfile(String),
    /// `INTO OUTFILE 'file' ...`.
    Outfile {
        /// The file name.
        file: String,
        /// `CHARACTER SET`.
        charset: Option<String>,
        /// Field options.
        fields: FieldOptions,
        /// Line options.
        lines: LineOptions,
    },
}

fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
}

/// `INTO ...`.
#[derive(Debug, Clone)]
pub struct SelectInto {
    /// Where the rows go.
    pub target: IntoTarget,
}

impl Expression for SelectInto {
    fn write_sql(&self, w: &mut SqlWriter<'_>, _start: usize) -> Result<Vec<Arg>> {
        match &self.target {
            IntoTarget::Variables(vars) => {
                let vars: Vec<String> = vars.iter().map(|v| format!("@{v}")).collect();
                write!(w, "INTO {}", vars.join(", "))?;
            }
            IntoTarget::Dumpfile(file) => write!(w, "INTO DUMPFILE {}", literal(file))?,
            IntoTarget::Outfile {
                file,
                charset,
                fields,
                lines,
            } => {
                write!(w, "INTO OUTFILE {}", literal(file))?;
                if let Some(charset) = charset {
                    write!(w, " CHARACTER SET {charset}")?;
                }
                if !fields.is_empty() {
                    w.write_str(" FIELDS")?;
                    if let Some(t) = &fields.terminated_by {
                        write!(w, " TERMINATED BY {}", literal(t))?;
                    }
                    if let Some(e) = &fields.enclosed_by {
                        if fields.optionally_enclosed {
                            w.write_str(" OPTIONALLY")?;
                        }
                        write!(w, " ENCLOSED BY {}", literal(e))?;
                    }
                    if let Some(e) = &fields.escaped_by {
                        write!(w, " ESCAPED BY {}", literal(e))?;
                    }
                }
                if lines.starting_by.is_some() || lines.terminated_by.is_some() {
                    w.write_str(" LINES")?;
                    if let Some(s) = &lines.starting_by {
                        write!(w, " STARTING BY {}", literal(s))?;
                    }
                    if let Some(t) = &lines.terminated_by {
                        write!(w, " TERMINATED BY {}", literal(t))?;
                    }
                }
            }
        }
        Ok(vec![])
    }
}
