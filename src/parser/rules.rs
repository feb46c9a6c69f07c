/// One entry of an ordered rule chain.
pub struct Rule<I: ?Sized, R> {
    pub name: &'static str,
    pub test: fn(&I) -> bool,
    pub result: R,
}

/// First rule whose test passes, in declaration order.
pub fn first_match<'r, I: ?Sized, R>(rules: &'r [Rule<I, R>], input: &I) -> Option<&'r Rule<I, R>> {
    rules.iter().find(|r| (r.test)(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    static RULES: &[Rule<str, u8>] = &[
        Rule { name: "long", test: |s| s.len() > 3, result: 1 },
        Rule { name: "any_a", test: |s| s.contains('a'), result: 2 },
    ];

    #[test]
    fn order_decides_ties() {
        assert_eq!(first_match(RULES, "banana").map(|r| r.result), Some(1));
        assert_eq!(first_match(RULES, "ab").map(|r| r.name), Some("any_a"));
        assert!(first_match(RULES, "xy").is_none());
    }
}
