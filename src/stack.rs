use crate::constants;
use crate::error::Fault;
use crate::value::{Label, Value};

fn wrong_type(expected: &'static str, found: &Value) -> Fault {
    Fault::WrongType {
        expected,
        found: found.type_name(),
    }
}

/// Bounded operand stack.
///
/// Variable-length sequences ("ranges") live inline on the stack as their
/// elements followed by an `Int` count on top; [`join`], [`split`],
/// [`push_str`] and [`pop_string`] maintain that convention.
///
/// [`join`]: #method.join
/// [`split`]: #method.split
/// [`push_str`]: #method.push_str
/// [`pop_string`]: #method.pop_string
#[derive(Clone, Debug, Default)]
pub struct DataStack {
    values: Vec<Value>,
}

impl DataStack {
    pub fn new() -> DataStack {
        DataStack { values: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.values.len()
    }

    /// Bottom-to-top view of the stack.
    pub fn values(&self) -> &[Value] {
        &self.values[..]
    }

    pub fn push(&mut self, value: Value) -> Result<(), Fault> {
        if self.values.len() >= constants::DATA_STACK_CAPACITY {
            return Err(Fault::StackOverflow);
        }
        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value, Fault> {
        self.values.pop().ok_or(Fault::StackUnderflow)
    }

    pub fn pop_bool(&mut self) -> Result<bool, Fault> {
        match self.pop()? {
            Value::Bool(b) => Ok(b),
            other => Err(wrong_type("boolean", &other)),
        }
    }

    pub fn pop_char(&mut self) -> Result<char, Fault> {
        match self.pop()? {
            Value::Char(c) => Ok(c),
            other => Err(wrong_type("character", &other)),
        }
    }

    pub fn pop_int(&mut self) -> Result<i32, Fault> {
        match self.pop()? {
            Value::Int(i) => Ok(i),
            other => Err(wrong_type("integer", &other)),
        }
    }

    pub fn pop_float(&mut self) -> Result<f64, Fault> {
        match self.pop()? {
            Value::Float(x) => Ok(x),
            other => Err(wrong_type("float", &other)),
        }
    }

    pub fn pop_label(&mut self) -> Result<Label, Fault> {
        match self.pop()? {
            Value::Label(l) => Ok(l),
            other => Err(wrong_type("label", &other)),
        }
    }

    pub fn dup(&mut self) -> Result<(), Fault> {
        let top = self.values.last().cloned().ok_or(Fault::StackUnderflow)?;
        self.push(top)
    }

    pub fn swap(&mut self) -> Result<(), Fault> {
        let len = self.values.len();
        if len < 2 {
            return Err(Fault::StackUnderflow);
        }
        self.values.swap(len - 1, len - 2);
        Ok(())
    }

    /// Rotates the top `count` values. Clockwise sinks the top value to the
    /// bottom of the window; counter-clockwise raises the bottom of the
    /// window to the top.
    pub fn rotate(&mut self, count: usize, clockwise: bool) -> Result<(), Fault> {
        if count == 0 {
            return Err(Fault::ZeroRotation);
        }
        let len = self.values.len();
        if len < count {
            return Err(Fault::StackUnderflow);
        }
        if clockwise {
            let top = self.values.remove(len - 1);
            self.values.insert(len - count, top);
        } else {
            let bottom = self.values.remove(len - count);
            self.values.push(bottom);
        }
        Ok(())
    }

    /// Pushes a copy of the `k`-th value from the top (1 is the top).
    pub fn pick(&mut self, k: usize) -> Result<(), Fault> {
        let len = self.values.len();
        if k == 0 || len < k {
            return Err(Fault::StackUnderflow);
        }
        let value = self.values[len - k].clone();
        self.push(value)
    }

    /// Replaces the `k`-th value from the top (1 is the top).
    pub fn put(&mut self, value: Value, k: usize) -> Result<(), Fault> {
        let len = self.values.len();
        if k == 0 || len < k {
            return Err(Fault::StackUnderflow);
        }
        self.values[len - k] = value;
        Ok(())
    }

    /// Concatenates the two topmost ranges: pops the outer count, removes
    /// the inner count buried below the outer range, and pushes the summed
    /// count. Either range may be empty.
    pub fn join(&mut self) -> Result<(), Fault> {
        let outer = self.pop_int()?;
        if outer < 0 {
            return Err(Fault::BadRange(outer));
        }
        let len = self.values.len();
        if len < outer as usize + 1 {
            return Err(Fault::StackUnderflow);
        }
        let inner_at = len - outer as usize - 1;
        let inner = match &self.values[inner_at] {
            Value::Int(i) if *i >= 0 => *i,
            Value::Int(i) => return Err(Fault::BadRange(*i)),
            other => return Err(wrong_type("integer", other)),
        };
        if inner_at < inner as usize {
            return Err(Fault::StackUnderflow);
        }
        self.values.remove(inner_at);
        self.push(Value::Int(outer + inner))
    }

    /// Splits the topmost range so that its first-pushed `at` elements form
    /// an inner range and the remaining elements stay on top with their own
    /// count. `at` may be 0; the top part is never empty.
    pub fn split(&mut self, at: i32) -> Result<(), Fault> {
        let count = self.pop_int()?;
        if count < 1 {
            return Err(Fault::BadRange(count));
        }
        if at < 0 || at >= count {
            return Err(Fault::BadSplit { count, at });
        }
        let len = self.values.len();
        if len < count as usize {
            return Err(Fault::StackUnderflow);
        }
        let upper = count - at;
        self.values.insert(len - upper as usize, Value::Int(at));
        self.push(Value::Int(upper))
    }

    /// Pushes the characters of `text` followed by the length.
    pub fn push_str(&mut self, text: &str) -> Result<(), Fault> {
        if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
            return Err(Fault::NonAscii(c));
        }
        for c in text.chars() {
            self.push(Value::Char(c))?;
        }
        self.push(Value::Int(text.len() as i32))
    }

    /// Pops a non-empty character range, restoring left-to-right order:
    /// the topmost character is the last one of the returned string.
    pub fn pop_string(&mut self) -> Result<String, Fault> {
        let count = self.pop_int()?;
        if count < 1 {
            return Err(Fault::BadRange(count));
        }
        let mut chars = Vec::with_capacity(count as usize);
        for _ in 0..count {
            chars.push(self.pop_char()?);
        }
        Ok(chars.into_iter().rev().collect())
    }

    /// Bottom-to-top snapshot for the per-tick debug trace. Characters are
    /// quoted, except that whitespace characters show as the word pushing
    /// them.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            match value {
                Value::Char(' ') => out.push_str("SPACE"),
                Value::Char('\t') => out.push_str("TAB"),
                Value::Char('\n') => out.push_str("NEWLINE"),
                other => out.push_str(&other.quoted()),
            }
        }
        out
    }
}

/// Bounded stack of return addresses.
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    indices: Vec<usize>,
}

impl CallStack {
    pub fn new() -> CallStack {
        CallStack {
            indices: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    pub fn push(&mut self, index: usize) -> Result<(), Fault> {
        if self.indices.len() >= constants::CALL_STACK_CAPACITY {
            return Err(Fault::CallStackOverflow);
        }
        self.indices.push(index);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<usize, Fault> {
        self.indices.pop().ok_or(Fault::CallStackUnderflow)
    }
}
