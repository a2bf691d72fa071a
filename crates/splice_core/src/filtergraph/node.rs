//! Tagged filter structures, serialized to ffmpeg syntax only via `Display`.

use std::fmt;

use serde::Serialize;

/// One filter option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterArg {
    Positional(String),
    Named(String, String),
}

/// A single filter: operation plus ordered parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub name: String,
    pub args: Vec<FilterArg>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional parameter.
    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push(FilterArg::Positional(value.to_string()));
        self
    }

    /// Append `key=value`.
    pub fn opt(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.args
            .push(FilterArg::Named(key.into(), value.to_string()));
        self
    }

    /// Append `key='value'`, for expressions containing `,` or `:`.
    pub fn opt_quoted(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let quoted = format!("'{}'", value.as_ref());
        self.opt(key, quoted)
    }

    /// Value of a named option, quotes included.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.args.iter().find_map(|a| match a {
            FilterArg::Named(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            f.write_str(if i == 0 { "=" } else { ":" })?;
            match arg {
                FilterArg::Positional(v) => f.write_str(v)?,
                FilterArg::Named(k, v) => write!(f, "{}={}", k, v)?,
            }
        }
        Ok(())
    }
}

/// Comma-joined sequence of filters (`-vf`/`-af` value or clause body).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn with(mut self, filter: Filter) -> Self {
        self.push(filter);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// First filter with the given name.
    pub fn find(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl FromIterator<Filter> for FilterChain {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", filter)?;
        }
        Ok(())
    }
}

/// `[in1][in2]chain[out]` within a filtergraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphClause {
    pub inputs: Vec<String>,
    pub chain: FilterChain,
    pub output: String,
}

impl GraphClause {
    pub fn new<I, S>(inputs: I, chain: FilterChain, output: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            chain,
            output: output.into(),
        }
    }
}

impl fmt::Display for GraphClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "[{}]", input)?;
        }
        write!(f, "{}[{}]", self.chain, self.output)
    }
}

/// Semicolon-joined clauses, passed to `-filter_complex`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterGraph {
    clauses: Vec<GraphClause>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clause: GraphClause) {
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[GraphClause] {
        &self.clauses
    }

    /// Clause producing the given label.
    pub fn clause(&self, output: &str) -> Option<&GraphClause> {
        self.clauses.iter().find(|c| c.output == output)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}
