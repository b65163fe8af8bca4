use crate::{Backend, HelperResult, SqliteMode};

/// Error that is raised when a connection string cannot be parsed.
#[derive(thiserror::Error, Debug)]
#[error("malformed connection string: {reason} (at position {position})")]
pub struct ConnectStringError {
    reason: &'static str,
    position: usize,
}

impl ConnectStringError {
    fn new(reason: &'static str, position: usize) -> Self {
        Self { reason, position }
    }
}

// Groups of equivalent keys; the first entry of each group is used for rendering.
const KEY_ALIASES: [&[&str]; 5] = [
    &["Server", "Data Source", "Address", "Addr", "Network Address"],
    &["Database", "Initial Catalog"],
    &["User Id", "UID", "User"],
    &["Password", "PWD"],
    &["Trusted_Connection", "Integrated Security"],
];

pub(crate) const SERVER: &str = "Server";
pub(crate) const DATABASE: &str = "Database";
pub(crate) const USER_ID: &str = "User Id";
pub(crate) const PASSWORD: &str = "Password";
pub(crate) const TRUSTED_CONNECTION: &str = "Trusted_Connection";
pub(crate) const PROVIDER: &str = "Provider";
pub(crate) const MODE: &str = "Mode";

fn canonical(key: &str) -> &str {
    let key = key.trim();
    KEY_ALIASES
        .iter()
        .find(|group| group.iter().any(|alias| alias.eq_ignore_ascii_case(key)))
        .map_or(key, |group| group[0])
}

fn same_key(k1: &str, k2: &str) -> bool {
    canonical(k1).eq_ignore_ascii_case(canonical(k2))
}

/// A connection string, a list of `key=value` pairs separated by `;`.
///
/// Keys are case-insensitive, and the usual aliases are understood
/// (e.g. `Data Source` for `Server`, `Initial Catalog` for `Database`, `UID` for `User Id`,
/// `PWD` for `Password`, `Integrated Security` for `Trusted_Connection`).
/// Values can be enclosed in `"` or `'`, which allows them to contain `;`;
/// a quote character within a quoted value is written twice.
///
/// The order of the pairs is preserved. `Display` hides the password.
///
/// # Example
///
/// ```rust
/// use sqlhelper::ConnectString;
///
/// let cs: ConnectString = "Data Source=db01; Initial Catalog=Sales; UID=meier; PWD='se;cret'"
///     .parse()
///     .unwrap();
/// assert_eq!(cs.server(), Some("db01"));
/// assert_eq!(cs.database(), Some("Sales"));
/// assert_eq!(cs.password(), Some("se;cret"));
/// assert_eq!(
///     cs.to_string(),
///     "Data Source=db01; Initial Catalog=Sales; UID=meier; PWD=***;"
/// );
/// ```
#[derive(Clone, Default, Eq, PartialEq)]
pub struct ConnectString {
    pairs: Vec<(String, String)>,
}

impl ConnectString {
    /// Creates an empty connection string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of a key.
    ///
    /// If the key (or one of its aliases) is already present, its value is replaced in place.
    pub fn set<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) -> &mut Self {
        let (key, value) = (key.as_ref().trim(), value.as_ref());
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| same_key(k, key)) {
            value.clone_into(&mut pair.1);
        } else {
            self.pairs.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// Removes a key (or its alias) and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.pairs.iter().position(|(k, _)| same_key(k, key))?;
        Some(self.pairs.remove(idx).1)
    }

    /// Returns the value of a key (or its alias).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| same_key(k, key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the key (or its alias) is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over the pairs, in their original order and spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Value of `Server`.
    pub fn server(&self) -> Option<&str> {
        self.get(SERVER)
    }

    /// Value of `Database`.
    pub fn database(&self) -> Option<&str> {
        self.get(DATABASE)
    }

    /// Value of `User Id`.
    pub fn user(&self) -> Option<&str> {
        self.get(USER_ID)
    }

    /// Value of `Password`.
    pub fn password(&self) -> Option<&str> {
        self.get(PASSWORD)
    }

    /// True if `Trusted_Connection` is set to `true`, `yes` or `sspi`.
    pub fn is_trusted(&self) -> bool {
        self.get(TRUSTED_CONNECTION).map_or(false, |v| {
            ["true", "yes", "sspi"]
                .iter()
                .any(|t| t.eq_ignore_ascii_case(v.trim()))
        })
    }

    /// The backend that is named with `Provider`, if any.
    ///
    /// # Errors
    ///
    /// `HelperError::UsageDetailed` if the provider is unknown.
    pub fn backend(&self) -> HelperResult<Option<Backend>> {
        self.get(PROVIDER).map(str::parse).transpose()
    }

    /// The value of `Mode`, which is only evaluated by the SQLite backend.
    ///
    /// # Errors
    ///
    /// `HelperError::UsageDetailed` if the mode is unknown.
    pub fn sqlite_mode(&self) -> HelperResult<SqliteMode> {
        self.get(MODE)
            .map_or_else(|| Ok(SqliteMode::default()), str::parse)
    }

    // Renders the string including the password.
    pub(crate) fn to_unredacted_string(&self) -> String {
        let mut s = String::new();
        for (idx, (key, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                s.push(' ');
            }
            s.push_str(key);
            s.push('=');
            push_value(&mut s, value);
            s.push(';');
        }
        s
    }
}

fn push_value(s: &mut String, value: &str) {
    let needs_quotes = value.contains(';')
        || value.starts_with(['"', '\''])
        || value.trim() != value;
    if needs_quotes {
        s.push('"');
        s.push_str(&value.replace('"', "\"\""));
        s.push('"');
    } else {
        s.push_str(value);
    }
}

impl std::fmt::Display for ConnectString {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (idx, (key, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            if same_key(key, PASSWORD) {
                write!(f, "{key}=***;")?;
            } else {
                let mut rendered = String::new();
                push_value(&mut rendered, value);
                write!(f, "{key}={rendered};")?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectString {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_tuple("ConnectString").field(&self.to_string()).finish()
    }
}

impl std::str::FromStr for ConnectString {
    type Err = ConnectStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cs = Self::new();
        let mut rest = s;
        let position = |rest: &str| s.len() - rest.len();

        loop {
            rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
            if rest.is_empty() {
                break;
            }

            let eq = rest
                .find('=')
                .filter(|eq| !rest[..*eq].contains(';'))
                .ok_or_else(|| ConnectStringError::new("key without '='", position(rest)))?;
            let key = rest[..eq].trim();
            if key.is_empty() {
                return Err(ConnectStringError::new("empty key", position(rest)));
            }
            rest = rest[eq + 1..].trim_start();

            let value = match rest.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let mut value = String::new();
                    let mut end = None;
                    let mut chars = rest.char_indices().skip(1).peekable();
                    while let Some((idx, c)) = chars.next() {
                        if c != quote {
                            value.push(c);
                        } else if chars.peek().map(|(_, c)| *c) == Some(quote) {
                            value.push(quote);
                            chars.next();
                        } else {
                            end = Some(idx + 1);
                            break;
                        }
                    }
                    let end = end
                        .ok_or_else(|| ConnectStringError::new("unterminated quote", position(rest)))?;
                    rest = rest[end..].trim_start();
                    if !(rest.is_empty() || rest.starts_with(';')) {
                        return Err(ConnectStringError::new(
                            "unexpected text after quoted value",
                            position(rest),
                        ));
                    }
                    value
                }
                _ => {
                    let end = rest.find(';').unwrap_or(rest.len());
                    let value = rest[..end].trim().to_string();
                    rest = &rest[end..];
                    value
                }
            };
            cs.set(key, value);
        }
        Ok(cs)
    }
}

#[cfg(test)]
mod test {
    use super::ConnectString;
    use crate::{Backend, SqliteMode};

    #[test]
    fn test_parse() {
        let cs: ConnectString = "Server=myhost; Database=db1; Trusted_Connection=True;"
            .parse()
            .unwrap();
        assert_eq!(cs.len(), 3);
        assert_eq!(cs.server(), Some("myhost"));
        assert_eq!(cs.get("initial catalog"), Some("db1"));
        assert!(cs.is_trusted());
        assert_eq!(cs.user(), None);
        assert_eq!(
            cs.to_string(),
            "Server=myhost; Database=db1; Trusted_Connection=True;"
        );

        let cs: ConnectString = r#"  uid = meier ;pwd="a;b""c" ;Integrated Security=no"#
            .parse()
            .unwrap();
        assert_eq!(cs.user(), Some("meier"));
        assert_eq!(cs.password(), Some(r#"a;b"c"#));
        assert!(!cs.is_trusted());
        assert_eq!(cs.to_string(), "uid=meier; pwd=***; Integrated Security=no;");
        assert_eq!(
            cs.to_unredacted_string(),
            r#"uid=meier; pwd="a;b""c"; Integrated Security=no;"#
        );
        assert_eq!(
            cs.to_unredacted_string().parse::<ConnectString>().unwrap(),
            cs
        );

        let cs: ConnectString = "Database=a;Database=b;Value=' x '".parse().unwrap();
        assert_eq!(cs.len(), 2);
        assert_eq!(cs.database(), Some("b"));
        assert_eq!(cs.get("VALUE"), Some(" x "));
    }

    #[test]
    fn test_parse_errors() {
        for s in ["Server", "Server;Database=x", "=x", "Password='abc", "Pwd='a' b;"] {
            let e = s.parse::<ConnectString>().unwrap_err();
            println!("{s}: {e}");
        }
        assert!("".parse::<ConnectString>().unwrap().is_empty());
    }

    #[test]
    fn test_provider_and_mode() {
        let mut cs: ConnectString = "Provider=mssql; Server=x".parse().unwrap();
        assert_eq!(cs.backend().unwrap(), Some(Backend::Mssql));
        assert_eq!(cs.remove("provider").as_deref(), Some("mssql"));
        assert_eq!(cs.backend().unwrap(), None);
        assert_eq!(cs.sqlite_mode().unwrap(), SqliteMode::ReadWriteCreate);

        cs.set("mode", "Memory");
        assert_eq!(cs.sqlite_mode().unwrap(), SqliteMode::Memory);
        cs.set("Provider", "db2");
        assert!(cs.backend().is_err());
    }
}
