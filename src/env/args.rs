//! `create_env` argument shapes
//!
//! Callers pass one to three positional arguments. Each is tagged as a
//! string (name or reference), an [`Options`] mapping, or a consumer
//! [`Context`] instance, and the list is normalized into [`EnvArgs`].

use crate::error::{Error, Result};
use crate::options::Options;
use crate::plugin::Context;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub enum Arg {
    Str(String),
    Options(Options),
    Instance(Context),
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Arg::Str(s.clone())
    }
}

impl From<&Path> for Arg {
    fn from(p: &Path) -> Self {
        Arg::Str(p.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Arg {
    fn from(p: PathBuf) -> Self {
        Arg::from(p.as_path())
    }
}

impl From<&PathBuf> for Arg {
    fn from(p: &PathBuf) -> Self {
        Arg::from(p.as_path())
    }
}

impl From<Options> for Arg {
    fn from(options: Options) -> Self {
        Arg::Options(options)
    }
}

impl From<Context> for Arg {
    fn from(instance: Context) -> Self {
        Arg::Instance(instance)
    }
}

impl From<&Context> for Arg {
    fn from(instance: &Context) -> Self {
        Arg::Instance(instance.clone())
    }
}

/// Positional arguments to `create_env`
#[derive(Debug, Clone, Default)]
pub struct ArgList(Vec<Arg>);

impl ArgList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Arg>> for ArgList {
    fn from(args: Vec<Arg>) -> Self {
        ArgList(args)
    }
}

impl From<Arg> for ArgList {
    fn from(arg: Arg) -> Self {
        ArgList(vec![arg])
    }
}

impl From<&str> for ArgList {
    fn from(s: &str) -> Self {
        ArgList(vec![s.into()])
    }
}

impl From<String> for ArgList {
    fn from(s: String) -> Self {
        ArgList(vec![s.into()])
    }
}

impl From<&String> for ArgList {
    fn from(s: &String) -> Self {
        ArgList(vec![s.into()])
    }
}

impl From<&Path> for ArgList {
    fn from(p: &Path) -> Self {
        ArgList(vec![p.into()])
    }
}

impl From<PathBuf> for ArgList {
    fn from(p: PathBuf) -> Self {
        ArgList(vec![p.into()])
    }
}

impl From<&PathBuf> for ArgList {
    fn from(p: &PathBuf) -> Self {
        ArgList(vec![p.into()])
    }
}

impl<A, B> From<(A, B)> for ArgList
where
    A: Into<Arg>,
    B: Into<Arg>,
{
    fn from((a, b): (A, B)) -> Self {
        ArgList(vec![a.into(), b.into()])
    }
}

impl<A, B, C> From<(A, B, C)> for ArgList
where
    A: Into<Arg>,
    B: Into<Arg>,
    C: Into<Arg>,
{
    fn from((a, b, c): (A, B, C)) -> Self {
        ArgList(vec![a.into(), b.into(), c.into()])
    }
}

/// Normalized `(name, reference, instance, options)`
#[derive(Debug, Clone, Default)]
pub struct EnvArgs {
    pub name: Option<String>,
    pub reference: Option<String>,
    pub instance: Option<Context>,
    pub options: Options,
}

impl EnvArgs {
    /// Sort positional arguments into their roles
    ///
    /// - two strings: name, then reference
    /// - one string with an instance: the name
    /// - one string with options carrying `path`: the name
    /// - one string with options: the reference when it looks like a path
    ///   (see [`looks_like_path`]), otherwise the name
    /// - one string alone: the reference
    pub fn normalize(args: ArgList) -> Result<Self> {
        Self::normalize_with(args, |s, _| looks_like_path(s))
    }

    /// [`normalize`](Self::normalize) with a caller-supplied test deciding
    /// whether the lone string of a `(string, options)` pair is a reference
    pub fn normalize_with<F>(args: ArgList, is_reference: F) -> Result<Self>
    where
        F: Fn(&str, &Options) -> bool,
    {
        let ArgList(args) = args;
        if args.is_empty() || args.len() > 3 {
            return Err(Error::InvalidArguments(format!(
                "expected 1 to 3 arguments, got {}",
                args.len()
            )));
        }

        let mut strings = Vec::new();
        let mut options = None;
        let mut instance = None;
        for arg in args {
            match arg {
                Arg::Str(s) => strings.push(s),
                Arg::Options(o) => {
                    if options.replace(o).is_some() {
                        return Err(Error::InvalidArguments(
                            "options given more than once".to_string(),
                        ));
                    }
                }
                Arg::Instance(i) => {
                    if instance.replace(i).is_some() {
                        return Err(Error::InvalidArguments(
                            "instance given more than once".to_string(),
                        ));
                    }
                }
            }
        }
        let has_options = options.is_some();
        let options = options.unwrap_or_default();

        let mut strings = strings.into_iter();
        let (first, second) = (strings.next(), strings.next());
        if strings.next().is_some() {
            return Err(Error::InvalidArguments(
                "at most a name and a path may be given".to_string(),
            ));
        }

        let (name, reference) = match (first, second, &instance) {
            (Some(_), Some(_), Some(_)) => {
                return Err(Error::InvalidArguments(
                    "a path and an instance cannot both be given".to_string(),
                ));
            }
            (Some(name), Some(reference), None) => (Some(name), Some(reference)),
            (Some(name), None, Some(_)) => (Some(name), None),
            (Some(first), None, None) => match options.path_ref() {
                Some(reference) => (Some(first), Some(reference.to_string())),
                None if !has_options || is_reference(&first, &options) => (None, Some(first)),
                None => (Some(first), None),
            },
            (None, _, Some(i)) => (Some(i.name().to_string()), None),
            (None, _, None) => {
                return Err(Error::InvalidArguments(
                    "a name, path or instance is required".to_string(),
                ));
            }
        };

        Ok(EnvArgs {
            name: name.filter(|n| !n.is_empty()),
            reference: reference.filter(|r| !r.is_empty()),
            instance,
            options,
        })
    }
}

/// Lexical path test: separators, a leading dot, an absolute path, a file
/// extension or a `prefix:` global reference
pub fn looks_like_path(s: &str) -> bool {
    let path = Path::new(s);
    s.contains('/')
        || s.contains(':')
        || s.contains(std::path::MAIN_SEPARATOR)
        || s.starts_with('.')
        || path.is_absolute()
        || path.extension().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(args: impl Into<ArgList>) -> EnvArgs {
        EnvArgs::normalize(args.into()).unwrap()
    }

    #[test]
    fn single_string_is_the_reference() {
        let args = normalize("fixtures/verb-readme-generator");
        assert_eq!(args.name, None);
        assert_eq!(args.reference.as_deref(), Some("fixtures/verb-readme-generator"));
    }

    #[test]
    fn name_and_path() {
        let args = normalize(("foo", "index.js"));
        assert_eq!(args.name.as_deref(), Some("foo"));
        assert_eq!(args.reference.as_deref(), Some("index.js"));
    }

    #[test]
    fn options_in_any_position() {
        let last = normalize(("foo", "index.js", Options::new().with("foo", "bar")));
        let middle = normalize(("foo", Options::new().with("foo", "bar"), "index.js"));
        for args in [last, middle] {
            assert_eq!(args.name.as_deref(), Some("foo"));
            assert_eq!(args.reference.as_deref(), Some("index.js"));
            assert_eq!(args.options.get_str("foo"), Some("bar"));
        }

        let path_only = normalize(("index.js", Options::new()));
        assert_eq!(path_only.name, None);
        assert_eq!(path_only.reference.as_deref(), Some("index.js"));
    }

    #[test]
    fn bare_name_with_options_is_the_name() {
        let args = normalize(("foo", Options::new().with("k", 1)));
        assert_eq!(args.name.as_deref(), Some("foo"));
        assert_eq!(args.reference, None);

        let args = normalize((Options::new(), "fixtures/foo"));
        assert_eq!(args.name, None);
        assert_eq!(args.reference.as_deref(), Some("fixtures/foo"));

        let args = normalize("foo");
        assert_eq!(args.reference.as_deref(), Some("foo"));
    }

    #[test]
    fn custom_reference_test_decides_lone_string() {
        let args = EnvArgs::normalize_with(("foo", Options::new()).into(), |s, _| s == "foo")
            .unwrap();
        assert_eq!(args.name, None);
        assert_eq!(args.reference.as_deref(), Some("foo"));
    }

    #[test]
    fn path_shapes() {
        for s in ["./foo", "../foo", "a/b", "/abs/x", "plugin.js", "npm:foo"] {
            assert!(looks_like_path(s), "{s}");
        }
        for s in ["foo", "verb-readme-generator", "default"] {
            assert!(!looks_like_path(s), "{s}");
        }
    }

    #[test]
    fn name_with_options_path() {
        let args = normalize(("foo", Options::new().path("lib/foo.js")));
        assert_eq!(args.name.as_deref(), Some("foo"));
        assert_eq!(args.reference.as_deref(), Some("lib/foo.js"));
    }

    #[test]
    fn name_with_instance() {
        let base = Context::new("base");
        let args = normalize(("foo-bar-baz", base.clone(), Options::new()));
        assert_eq!(args.name.as_deref(), Some("foo-bar-baz"));
        assert_eq!(args.reference, None);
        assert!(args.instance.unwrap().ptr_eq(&base));

        let args = normalize(Arg::from(Context::new("solo")));
        assert_eq!(args.name.as_deref(), Some("solo"));
    }

    #[test]
    fn rejected_shapes() {
        let cases: Vec<ArgList> = vec![
            Vec::<Arg>::new().into(),
            ("a", "b", "c").into(),
            (Options::new(), Options::new()).into(),
            ("a", "b", Context::new("x")).into(),
            Arg::from(Options::new()).into(),
            vec![Arg::from("a"), Arg::from("b"), Arg::from("c"), Arg::from("d")].into(),
        ];
        for case in cases {
            assert!(matches!(
                EnvArgs::normalize(case),
                Err(Error::InvalidArguments(_))
            ));
        }
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let args = normalize(("", "index.js"));
        assert_eq!(args.name, None);
        assert_eq!(args.reference.as_deref(), Some("index.js"));
    }
}
