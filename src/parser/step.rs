use std::collections::BTreeMap;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    Reference(u64),
    List(Vec<StepValue>),
    Null,
    Derived,
}

impl StepValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reference(&self) -> Option<u64> {
        match self {
            Self::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Numeric payload; integers widen to `f64`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// References contained in a list value, in list order.
    #[must_use]
    pub fn references(&self) -> Vec<u64> {
        match self {
            Self::List(items) => items.iter().filter_map(Self::as_reference).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepEntity {
    pub id: u64,
    pub entity_type: String,
    pub values: Vec<StepValue>,
}

impl StepEntity {
    #[must_use]
    pub fn string_at(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(StepValue::as_str)
    }

    #[must_use]
    pub fn reference_at(&self, index: usize) -> Option<u64> {
        self.values.get(index).and_then(StepValue::as_reference)
    }

    #[must_use]
    pub fn references_at(&self, index: usize) -> Vec<u64> {
        self.values
            .get(index)
            .map(StepValue::references)
            .unwrap_or_default()
    }
}

/// A parsed STEP physical file. Entities are kept in ascending id order.
#[derive(Debug)]
pub struct StepFile {
    pub entities: BTreeMap<u64, StepEntity>,
    pub schema: String,
}

impl StepFile {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut entities = BTreeMap::new();
        let mut schema = String::new();
        let mut in_data = false;
        let mut saw_data = false;
        let mut skipped = 0usize;

        for statement in split_statements(content) {
            let statement = statement.trim();

            if statement.starts_with("FILE_SCHEMA") {
                if let Some(start) = statement.find("('") {
                    if let Some(end) = statement[start + 2..].find('\'') {
                        schema = statement[start + 2..start + 2 + end].to_string();
                    }
                }
                continue;
            }

            match statement {
                "DATA" => {
                    in_data = true;
                    saw_data = true;
                    continue;
                }
                "ENDSEC" => {
                    in_data = false;
                    continue;
                }
                _ => {}
            }

            if in_data && statement.starts_with('#') {
                match Self::parse_entity(statement) {
                    Some(entity) => {
                        entities.insert(entity.id, entity);
                    }
                    None => skipped += 1,
                }
            }
        }

        if !saw_data {
            return Err(ParseError::InvalidStep {
                message: "missing DATA section".to_string(),
            });
        }
        if skipped > 0 {
            tracing::debug!(skipped, "Skipped malformed entity instances");
        }

        Ok(StepFile { entities, schema })
    }

    fn parse_entity(statement: &str) -> Option<StepEntity> {
        // Format: #123=IFCWALL('guid',#ref,'name',...)
        let eq_pos = statement.find('=')?;
        let id: u64 = statement[1..eq_pos].trim().parse().ok()?;

        let rest = statement[eq_pos + 1..].trim();
        let paren_pos = rest.find('(')?;
        if !rest.ends_with(')') {
            return None;
        }
        let entity_type = rest[..paren_pos].trim().to_ascii_uppercase();

        let values_str = &rest[paren_pos + 1..rest.len() - 1];
        let values = Self::parse_values(values_str);

        Some(StepEntity {
            id,
            entity_type,
            values,
        })
    }

    fn parse_values(s: &str) -> Vec<StepValue> {
        let mut values = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut paren_depth = 0i32;

        for ch in s.chars() {
            match ch {
                '\'' => {
                    in_string = !in_string;
                    current.push(ch);
                }
                '(' if !in_string => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' if !in_string => {
                    paren_depth -= 1;
                    current.push(ch);
                }
                ',' if !in_string && paren_depth == 0 => {
                    values.push(Self::parse_single_value(&current));
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.trim().is_empty() {
            values.push(Self::parse_single_value(&current));
        }

        values
    }

    fn parse_single_value(s: &str) -> StepValue {
        let s = s.trim();

        match s {
            "$" => return StepValue::Null,
            "*" => return StepValue::Derived,
            _ => {}
        }
        if let Some(id) = s.strip_prefix('#').and_then(|r| r.parse::<u64>().ok()) {
            return StepValue::Reference(id);
        }
        if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
            return StepValue::String(decode_step_string(&s[1..s.len() - 1]));
        }
        if s.len() >= 2 && s.starts_with('.') && s.ends_with('.') {
            return match &s[1..s.len() - 1] {
                "T" => StepValue::Boolean(true),
                "F" => StepValue::Boolean(false),
                inner => StepValue::Enum(inner.to_string()),
            };
        }
        if s.starts_with('(') && s.ends_with(')') {
            return StepValue::List(Self::parse_values(&s[1..s.len() - 1]));
        }
        if let Ok(i) = s.parse::<i64>() {
            return StepValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return StepValue::Real(f);
        }
        // Typed value like IFCREAL(1.) or IFCLABEL('x')
        if let Some(paren_pos) = s.find('(') {
            if s.ends_with(')') {
                return Self::parse_single_value(&s[paren_pos + 1..s.len() - 1]);
            }
        }

        StepValue::String(s.to_string())
    }

    #[must_use]
    pub fn get_entity(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Entities of one type, in ascending id order.
    pub fn entities_of_type<'a>(
        &'a self,
        entity_type: &'a str,
    ) -> impl Iterator<Item = &'a StepEntity> + 'a {
        self.entities
            .values()
            .filter(move |e| e.entity_type == entity_type)
    }
}

/// Splits the file body at `;` terminators, ignoring those inside string
/// literals and `/* */` comments. Statements may span several lines.
fn split_statements(content: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                in_string = !in_string;
                current.push(ch);
            }
            '/' if !in_string && chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' if !in_string => {
                statements.push(std::mem::take(&mut current));
            }
            '\r' | '\n' if !in_string => {}
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        statements.push(current);
    }

    statements
}

/// Decode STEP/IFC encoded strings.
///
/// Handles `\X2\XXXX\X0\` (UCS-2, several code units per run), `\X\hh`
/// (ISO 8859-1), `\S\c` (high-bit shift), `\\` and `''`.
fn decode_step_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
            }
            result.push('\'');
            continue;
        }
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek().copied() {
            Some('X') => {
                chars.next();
                match chars.next() {
                    Some('2') => {
                        chars.next(); // '\'
                        let hex: String = std::iter::from_fn(|| chars.next_if(|&c| c != '\\'))
                            .collect();
                        // terminator \X0\
                        for _ in 0..4 {
                            chars.next();
                        }
                        let units: Vec<u16> = hex
                            .as_bytes()
                            .chunks(4)
                            .filter_map(|chunk| std::str::from_utf8(chunk).ok())
                            .filter_map(|h| u16::from_str_radix(h, 16).ok())
                            .collect();
                        result.extend(char::decode_utf16(units).filter_map(Result::ok));
                    }
                    Some('\\') => {
                        let hex: String = chars.by_ref().take(2).collect();
                        if let Ok(code) = u8::from_str_radix(&hex, 16) {
                            result.push(char::from(code));
                        }
                    }
                    Some(other) => {
                        result.push_str("\\X");
                        result.push(other);
                    }
                    None => result.push_str("\\X"),
                }
            }
            Some('S') => {
                chars.next(); // 'S'
                chars.next(); // '\'
                if let Some(c) = chars.next() {
                    if let Ok(byte) = u8::try_from(u32::from(c)) {
                        result.push(char::from(byte | 0x80));
                    }
                }
            }
            Some('\\') => {
                chars.next();
                result.push('\\');
            }
            _ => result.push('\\'),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#10=IFCQUANTITYAREA('NetSideArea',$,$,20.,$);
#11=IFCELEMENTQUANTITY('0xyz',$,'Qto_WallBaseQuantities',$,$,
  (#10,#12));
#12=IFCQUANTITYVOLUME('NetVolume',$,$,4.E1,$);
/* comment; with a semicolon */
#13=IFCPROPERTYSINGLEVALUE('Note',$,IFCLABEL('a;b (c)'),$);
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn parses_multiline_entities_in_id_order() {
        let file = StepFile::parse(SAMPLE).unwrap();
        assert_eq!(file.schema, "IFC4");
        assert_eq!(file.entities.keys().copied().collect::<Vec<_>>(), vec![10, 11, 12, 13]);

        let qset = file.get_entity(11).unwrap();
        assert_eq!(qset.entity_type, "IFCELEMENTQUANTITY");
        assert_eq!(qset.string_at(2), Some("Qto_WallBaseQuantities"));
        assert_eq!(qset.references_at(5), vec![10, 12]);
    }

    #[test]
    fn parses_numbers_and_typed_values() {
        let file = StepFile::parse(SAMPLE).unwrap();
        assert_eq!(file.get_entity(10).unwrap().values[3], StepValue::Real(20.0));
        assert_eq!(file.get_entity(12).unwrap().values[3], StepValue::Real(40.0));
        assert_eq!(
            file.get_entity(13).unwrap().values[2],
            StepValue::String("a;b (c)".to_string())
        );
    }

    #[test]
    fn missing_data_section_is_an_error() {
        let err = StepFile::parse("ISO-10303-21;\nHEADER;\nENDSEC;\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStep { .. }));
    }

    #[test]
    fn decodes_escapes() {
        assert_eq!(decode_step_string("\\X2\\00E9\\X0\\t\\X2\\00E900E8\\X0\\"), "étéè");
        assert_eq!(decode_step_string("caf\\X\\E9"), "café");
        assert_eq!(decode_step_string("it''s"), "it's");
        assert_eq!(decode_step_string("a\\\\b"), "a\\b");
    }
}
