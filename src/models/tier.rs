/// Header color class of the notification card, derived from the pass rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Every case passed.
    Full,
    /// At least 80% passed.
    Partial,
    Failing,
}

impl Tier {
    pub fn from_pass_rate(rate: f64) -> Self {
        if rate >= 100.0 {
            Tier::Full
        } else if rate >= 80.0 {
            Tier::Partial
        } else {
            Tier::Failing
        }
    }

    /// Card header template name understood by the chat platform.
    pub fn template(&self) -> &'static str {
        match self {
            Tier::Full => "blue",
            Tier::Partial => "orange",
            Tier::Failing => "red",
        }
    }
}
