/// Output switches for a parse run. Neither switch changes what is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Write a token table row for every matched token.
    pub echo_tokens: bool,
    /// Write one `<Rule> ::= ...` line per completed reduction.
    pub trace_rules: bool,
}

impl ParseOptions {
    pub fn with_token_echo(mut self, enabled: bool) -> Self {
        self.echo_tokens = enabled;
        self
    }

    pub fn with_rule_trace(mut self, enabled: bool) -> Self {
        self.trace_rules = enabled;
        self
    }
}
