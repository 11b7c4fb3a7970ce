//! JSON 配置解析器
//!
//! 将嵌套的 JSON 文档展开为扁平的配置数据：对象成员名与数组下标依次作为路径段，
//! 标量的文本形式作为值。
//!
//! ```
//! use config_impl::JsonConfigurationFileParser;
//!
//! let data = JsonConfigurationFileParser::parse(r#"{"a": {"b": "c"}, "list": [1, 2]}"#).unwrap();
//! assert_eq!(data.len(), 3);
//! assert!(data.iter().any(|(key, value)| key.as_str() == "list:1" && value == "2"));
//! ```

use config_abstractions::{path, ConfigData, ConfigError, ConfigResult};
use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;
use uncased::{Uncased, UncasedStr};

/// JSON 配置文件解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConfigurationFileParser;

impl JsonConfigurationFileParser {
    /// 解析 JSON 文本
    ///
    /// 根节点必须是对象。注释 (`//`、`/* */`) 与开头的 BOM 会被忽略，数字保留原始文本。
    pub fn parse(input: &str) -> ConfigResult<ConfigData> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let (text, numbers) = scan(input);
        let mut walker = Walker {
            numbers,
            ..Walker::default()
        };
        let mut deserializer = serde_json::Deserializer::from_str(&text);

        let result = RootSeed {
            walker: &mut walker,
        }
        .deserialize(&mut deserializer)
        .and_then(|()| deserializer.end());

        match result {
            Ok(()) => {
                debug!("JSON 配置解析完成，共 {} 个配置项", walker.data.len());
                Ok(walker.data)
            }
            Err(error) => Err(walker.into_error(error, input)),
        }
    }
}

#[derive(Default)]
struct Walker {
    data: ConfigData,
    path: Vec<String>,
    /// 文档中数字字面量的原始文本，按出现顺序
    numbers: VecDeque<String>,
    failure: Option<Failure>,
}

enum Failure {
    DuplicateKey(String),
    UnsupportedToken { token: &'static str, path: String },
}

impl Walker {
    fn add_value<E: de::Error>(&mut self, value: String) -> Result<(), E> {
        let key = path::combine(&self.path);
        if self.data.contains_key(UncasedStr::new(&key)) {
            let message = format!("duplicate key '{key}'");
            self.failure = Some(Failure::DuplicateKey(key));
            return Err(E::custom(message));
        }
        self.data.insert(Uncased::from_owned(key), value);
        Ok(())
    }

    fn add_number<E: de::Error>(&mut self, parsed: String) -> Result<(), E> {
        let text = self.numbers.pop_front().unwrap_or(parsed);
        self.add_value(text)
    }

    fn unsupported<E: de::Error>(&mut self, token: &'static str) -> Result<(), E> {
        let path = path::combine(&self.path);
        let message = format!("unsupported token '{token}' at '{path}'");
        self.failure = Some(Failure::UnsupportedToken { token, path });
        Err(E::custom(message))
    }

    fn into_error(self, error: serde_json::Error, input: &str) -> ConfigError {
        let (line, column) = (error.line(), error.column());
        match self.failure {
            Some(Failure::DuplicateKey(key)) => ConfigError::DuplicateKey { key, line, column },
            Some(Failure::UnsupportedToken { token, path }) => ConfigError::UnsupportedToken {
                token,
                path,
                line,
                column,
            },
            None => ConfigError::JsonParse {
                line,
                column,
                excerpt: error_context(input, line),
                source: error,
            },
        }
    }
}

fn visit_members<'de, A: MapAccess<'de>>(walker: &mut Walker, mut map: A) -> Result<(), A::Error> {
    while let Some(name) = map.next_key::<String>()? {
        walker.path.push(name);
        map.next_value_seed(ValueSeed {
            walker: &mut *walker,
        })?;
        walker.path.pop();
    }
    Ok(())
}

fn visit_elements<'de, A: SeqAccess<'de>>(walker: &mut Walker, mut seq: A) -> Result<(), A::Error> {
    let mut index = 0usize;
    loop {
        walker.path.push(index.to_string());
        let element = seq.next_element_seed(ValueSeed {
            walker: &mut *walker,
        })?;
        walker.path.pop();
        if element.is_none() {
            return Ok(());
        }
        index += 1;
    }
}

struct RootSeed<'a> {
    walker: &'a mut Walker,
}

impl<'de> DeserializeSeed<'de> for RootSeed<'_> {
    type Value = ();

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(RootVisitor {
            walker: self.walker,
        })
    }
}

struct RootVisitor<'a> {
    walker: &'a mut Walker,
}

impl<'de> Visitor<'de> for RootVisitor<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<(), A::Error> {
        visit_members(self.walker, map)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _seq: A) -> Result<(), A::Error> {
        self.walker.unsupported("StartArray")
    }

    fn visit_str<E: de::Error>(self, _value: &str) -> Result<(), E> {
        self.walker.unsupported("String")
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<(), E> {
        self.walker.unsupported("Boolean")
    }

    fn visit_i64<E: de::Error>(self, _value: i64) -> Result<(), E> {
        self.walker.unsupported("Integer")
    }

    fn visit_u64<E: de::Error>(self, _value: u64) -> Result<(), E> {
        self.walker.unsupported("Integer")
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<(), E> {
        self.walker.unsupported("Float")
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        self.walker.unsupported("Null")
    }
}

struct ValueSeed<'a> {
    walker: &'a mut Walker,
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_> {
    type Value = ();

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(ValueVisitor {
            walker: self.walker,
        })
    }
}

struct ValueVisitor<'a> {
    walker: &'a mut Walker,
}

impl<'de> Visitor<'de> for ValueVisitor<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<(), A::Error> {
        visit_members(self.walker, map)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<(), A::Error> {
        visit_elements(self.walker, seq)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<(), E> {
        self.walker.add_value(value.to_owned())
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<(), E> {
        self.walker.add_value(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<(), E> {
        self.walker.add_number(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<(), E> {
        self.walker.add_number(value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<(), E> {
        self.walker.add_number(value.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        self.walker.add_value(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<(), E> {
        self.walker.add_value(String::new())
    }
}

/// 用空白替换注释，保留换行，使错误位置的行号不变；同时按顺序记录数字字面量的原始文本
fn scan(input: &str) -> (Cow<'_, str>, VecDeque<String>) {
    let mut output = String::with_capacity(input.len());
    let mut numbers = VecDeque::new();
    let mut has_comment = false;
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            output.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    output.push(escaped);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                output.push(c);
            }
            ('/', Some('/')) => {
                has_comment = true;
                output.push(' ');
                while let Some(&comment) = chars.peek() {
                    if comment == '\n' {
                        break;
                    }
                    chars.next();
                    output.push(blank(comment));
                }
            }
            ('/', Some('*')) => {
                has_comment = true;
                chars.next();
                output.push_str("  ");
                let mut previous = None;
                for comment in chars.by_ref() {
                    if previous == Some('*') && comment == '/' {
                        output.push(' ');
                        break;
                    }
                    output.push(blank(comment));
                    previous = Some(comment);
                }
            }
            ('-' | '0'..='9', _) => {
                let mut literal = String::from(c);
                while let Some(&digit) = chars.peek() {
                    if !matches!(digit, '0'..='9' | '.' | 'e' | 'E' | '+' | '-') {
                        break;
                    }
                    chars.next();
                    literal.push(digit);
                }
                output.push_str(&literal);
                numbers.push_back(literal);
            }
            _ => output.push(c),
        }
    }

    let text = if has_comment {
        Cow::Owned(output)
    } else {
        Cow::Borrowed(input)
    };
    (text, numbers)
}

fn blank(c: char) -> char {
    if c == '\n' || c == '\r' {
        c
    } else {
        ' '
    }
}

/// 出错行的上下文：第 1 行返回该行本身，否则返回截止到出错行的两行
fn error_context(input: &str, line: usize) -> String {
    let lines: Vec<&str> = input.lines().collect();
    if line >= 2 {
        let previous = lines.get(line - 2).map_or("", |text| text.trim());
        let current = lines.get(line - 1).map_or("", |text| text.trim());
        format!("{previous}\n{current}")
    } else {
        lines.first().copied().unwrap_or_default().to_owned()
    }
}
