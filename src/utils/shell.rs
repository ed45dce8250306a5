/// POSIX single-quote rendering for display. Output is never executed.
pub fn quote_arg(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '-' | '_' | '.' | '/' | '=' | ':' | ',' | '+' | '@')
        });
    if safe {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

pub fn join_args<'a, I>(args: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    args.into_iter().map(quote_arg).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{join_args, quote_arg};

    #[test]
    fn plain_tokens_stay_bare() {
        assert_eq!(
            quote_arg("-Djava.library.path=natives/linux"),
            "-Djava.library.path=natives/linux"
        );
    }

    #[test]
    fn metacharacters_are_single_quoted() {
        assert_eq!(quote_arg("out:libs/*"), "'out:libs/*'");
        assert_eq!(quote_arg("\"; rm -rf /\""), "'\"; rm -rf /\"'");
        assert_eq!(quote_arg("it's"), r"'it'\''s'");
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn join_quotes_each_arg() {
        assert_eq!(join_args(["java", "a b"]), "java 'a b'");
    }
}
