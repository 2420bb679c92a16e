use chrono::{Datelike, Local, Timelike};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

use super::Machine;
use crate::console::LogLevel;
use crate::disk::Disk;
use crate::error::Fault;
use crate::instr::Instr;
use crate::value::Value;

lazy_static! {
    static ref STR_INT_RE: Regex = Regex::new(r"^-?[0-9]{1,10}$").unwrap();
    static ref STR_HEX_RE: Regex = Regex::new(r"^(?i)(0x)?[0-9a-f]{1,8}$").unwrap();
}

pub(super) fn step(m: &mut Machine, instr: Instr) -> Result<(), Fault> {
    match instr {
        // ----- stack -----
        Instr::POP => {
            m.data.pop()?;
            Ok(())
        }
        Instr::POPN => {
            let n = positive(m.data.pop_int()?)?;
            for _ in 0..n {
                m.data.pop()?;
            }
            Ok(())
        }
        Instr::DUP => m.data.dup(),
        Instr::DUPN => {
            let n = positive(m.data.pop_int()?)?;
            for _ in 0..n {
                m.data.pick(n as usize)?;
            }
            Ok(())
        }
        Instr::SWAP => m.data.swap(),
        Instr::ROTATE => {
            let n = m.data.pop_int()?;
            if n == 0 {
                return Err(Fault::ZeroRotation);
            }
            m.data.rotate(n.unsigned_abs() as usize, n > 0)
        }
        Instr::PICK => {
            let k = positive(m.data.pop_int()?)?;
            m.data.pick(k as usize)
        }
        Instr::PUT => {
            let k = positive(m.data.pop_int()?)?;
            let value = m.data.pop()?;
            m.data.put(value, k as usize)
        }
        Instr::DEPTH => {
            let depth = m.data.depth() as i32;
            m.data.push(Value::Int(depth))
        }
        Instr::JOIN => m.data.join(),
        Instr::SPLIT => {
            let at = m.data.pop_int()?;
            m.data.split(at)
        }

        // ----- control flow -----
        Instr::NOOP => Ok(()),
        Instr::JUMP => {
            let label = m.data.pop_label()?;
            m.ip = label.index();
            Ok(())
        }
        Instr::CJUMP => {
            // label first, then the flag
            let label = m.data.pop_label()?;
            let jump = m.data.pop_bool()?;
            if jump {
                m.ip = label.index();
            }
            Ok(())
        }
        Instr::CALL => {
            let label = m.data.pop_label()?;
            // ip already points past the CALL
            m.calls.push(m.ip)?;
            m.ip = label.index();
            Ok(())
        }
        Instr::RETURN => {
            m.ip = m.calls.pop()?;
            Ok(())
        }
        Instr::EXECUTE => m.execute_nested(),
        Instr::EXIT => {
            m.exit_code = m.data.pop_int()?;
            m.halted = true;
            Ok(())
        }
        Instr::ABORT => {
            let message = m.data.pop_string()?;
            Err(Fault::Aborted(message))
        }

        // ----- I/O -----
        Instr::PRINT => {
            let value = m.data.pop()?;
            m.console.print(&value.to_string());
            Ok(())
        }
        Instr::PRINTSTR => {
            let text = m.data.pop_string()?;
            m.console.print(&text);
            Ok(())
        }
        Instr::ERROR => {
            let value = m.data.pop()?;
            m.console.error(&value.to_string());
            Ok(())
        }
        Instr::ERRORSTR => {
            let text = m.data.pop_string()?;
            m.console.error(&text);
            Ok(())
        }
        Instr::GETLINE => {
            let line = m
                .console
                .get_line()
                .map_err(|err| Fault::Io(err.to_string()))?;
            m.data.push_str(&line)
        }
        Instr::LOG => {
            let level = log_level(m.data.pop_int()?)?;
            let value = m.data.pop()?;
            m.console.log(level, &value.to_string());
            Ok(())
        }
        Instr::LOGSTR => {
            let level = log_level(m.data.pop_int()?)?;
            let text = m.data.pop_string()?;
            m.console.log(level, &text);
            Ok(())
        }
        Instr::DEBUG => {
            let enabled = m.data.pop_bool()?;
            m.console.set_debug(enabled);
            Ok(())
        }
        Instr::SPACE => m.data.push(Value::Char(' ')),
        Instr::TAB => m.data.push(Value::Char('\t')),
        Instr::NEWLINE => m.data.push(Value::Char('\n')),

        // ----- conversion -----
        Instr::TOSTRING => {
            let value = m.data.pop()?;
            m.data.push_str(&value.quoted())
        }
        Instr::STRTOI => {
            let text = m.data.pop_string()?;
            match int_from_str(&text) {
                Some(value) => m.data.push(Value::Int(value)),
                None => Err(Fault::BadNumber {
                    kind: "an integer",
                    text,
                }),
            }
        }
        Instr::STRTOF => {
            let text = m.data.pop_string()?;
            match text.parse::<f64>() {
                Ok(value) => m.data.push(Value::Float(value)),
                Err(_) => Err(Fault::BadNumber {
                    kind: "a float",
                    text,
                }),
            }
        }
        Instr::STRTOB => {
            let text = m.data.pop_string()?;
            m.data.push(Value::Bool(text.eq_ignore_ascii_case("true")))
        }
        Instr::HEXTOI => {
            let text = m.data.pop_string()?;
            match hex_from_str(&text) {
                Some(value) => m.data.push(Value::Int(value)),
                None => Err(Fault::BadNumber {
                    kind: "a hex number",
                    text,
                }),
            }
        }
        Instr::ITOHEX => {
            let value = m.data.pop_int()?;
            m.data.push_str(&format!("{:x}", value as u32))
        }
        Instr::ITOF => {
            let value = m.data.pop_int()?;
            m.data.push(Value::Float(f64::from(value)))
        }
        Instr::FTOI => {
            let value = m.data.pop_float()?;
            m.data.push(Value::Int(value as i32))
        }
        Instr::ITOB => {
            let value = m.data.pop_int()?;
            m.data.push(Value::Bool(value != 0))
        }
        Instr::BTOI => {
            let value = m.data.pop_bool()?;
            m.data.push(Value::Int(value as i32))
        }
        Instr::FTOB => {
            let value = m.data.pop_float()?;
            m.data.push(Value::Bool(value != 0.0))
        }
        Instr::CTOI => {
            let c = m.data.pop_char()?;
            m.data.push(Value::Int(c as i32))
        }
        Instr::ITOC => {
            let code = m.data.pop_int()?;
            if (0..=127).contains(&code) {
                m.data.push(Value::Char(code as u8 as char))
            } else {
                Err(Fault::BadCharCode(code))
            }
        }

        // ----- classification -----
        Instr::STRISINT => {
            let text = m.data.pop_string()?;
            m.data.push(Value::Bool(int_from_str(&text).is_some()))
        }
        Instr::STRISHEX => {
            let text = m.data.pop_string()?;
            m.data.push(Value::Bool(STR_HEX_RE.is_match(&text)))
        }
        Instr::STRISBOOL => {
            let text = m.data.pop_string()?;
            let is_bool =
                text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false");
            m.data.push(Value::Bool(is_bool))
        }
        Instr::STRISFLOAT => {
            let text = m.data.pop_string()?;
            m.data.push(Value::Bool(text.parse::<f64>().is_ok()))
        }
        Instr::ISBOOL => tag_test(m, |v| matches!(v, Value::Bool(_))),
        Instr::ISCHAR => tag_test(m, |v| matches!(v, Value::Char(_))),
        Instr::ISINT => tag_test(m, |v| matches!(v, Value::Int(_))),
        Instr::ISFLOAT => tag_test(m, |v| matches!(v, Value::Float(_))),
        Instr::ISLABEL => tag_test(m, |v| matches!(v, Value::Label(_))),

        // ----- logic -----
        Instr::AND => bool_binary(m, |a, b| a && b),
        Instr::OR => bool_binary(m, |a, b| a || b),
        Instr::XOR => bool_binary(m, |a, b| a != b),
        Instr::NOT => {
            let value = m.data.pop_bool()?;
            m.data.push(Value::Bool(!value))
        }

        // ----- bitwise -----
        Instr::BAND => int_binary(m, |a, b| a & b),
        Instr::BOR => int_binary(m, |a, b| a | b),
        Instr::BXOR => int_binary(m, |a, b| a ^ b),
        Instr::BNOT => {
            let value = m.data.pop_int()?;
            m.data.push(Value::Int(!value))
        }
        Instr::SHIFTL => int_binary(m, |a, b| a.wrapping_shl(b as u32)),
        Instr::SHIFTR => int_binary(m, |a, b| a.wrapping_shr(b as u32)),

        // ----- comparison -----
        Instr::EQUALS => int_compare(m, |a, b| a == b),
        Instr::LESS => int_compare(m, |a, b| a < b),
        Instr::GREATER => int_compare(m, |a, b| a > b),
        Instr::LESSEQ => int_compare(m, |a, b| a <= b),
        Instr::GREATEREQ => int_compare(m, |a, b| a >= b),
        Instr::FEQUALS => {
            let b = m.data.pop_float()?;
            let a = m.data.pop_float()?;
            m.data.push(Value::Bool(a.to_bits() == b.to_bits()))
        }
        Instr::FLESS => float_compare(m, |a, b| a < b),
        Instr::FGREATER => float_compare(m, |a, b| a > b),

        // ----- math -----
        Instr::IADD => int_binary(m, i32::wrapping_add),
        Instr::ISUB => int_binary(m, i32::wrapping_sub),
        Instr::IMUL => int_binary(m, i32::wrapping_mul),
        Instr::IDIV => int_division(m, i32::wrapping_div),
        Instr::MOD => int_division(m, i32::wrapping_rem),
        Instr::IPOW => {
            let exponent = m.data.pop_int()?;
            let base = m.data.pop_int()?;
            let result = f64::from(base).powi(exponent);
            m.data.push(Value::Int(result.round() as i32))
        }
        Instr::RAND => {
            let bound = positive(m.data.pop_int()?)?;
            let value = m.rng.gen_range(0..bound);
            m.data.push(Value::Int(value))
        }
        Instr::FSUM => float_binary(m, |a, b| a + b),
        Instr::FSUB => float_binary(m, |a, b| a - b),
        Instr::FMUL => float_binary(m, |a, b| a * b),
        Instr::FDIV => {
            let divisor = m.data.pop_float()?;
            let dividend = m.data.pop_float()?;
            if divisor == 0.0 {
                return Err(Fault::DivisionByZero);
            }
            m.data.push(Value::Float(dividend / divisor))
        }

        // ----- time -----
        Instr::GETTIME => {
            let now = Local::now();
            m.data.push(Value::Int(now.hour() as i32))?;
            m.data.push(Value::Int(now.minute() as i32))?;
            m.data.push(Value::Int(now.second() as i32))
        }
        Instr::GETDATE => {
            let now = Local::now();
            m.data.push(Value::Int(now.year()))?;
            m.data.push(Value::Int(now.month() as i32))?;
            m.data.push(Value::Int(now.day() as i32))
        }
        Instr::SLEEP => {
            let millis = positive(m.data.pop_int()?)?;
            if !m.console.sleep(millis as u64) {
                m.halted = true;
                m.exit_code = 1;
            }
            Ok(())
        }

        // ----- disk -----
        Instr::MOUNT => {
            let sector_count = m.data.pop_int()?;
            let sector_size = m.data.pop_int()?;
            let name = m.data.pop_string()?;
            if sector_size <= 0 || sector_count <= 0 {
                return Err(Fault::BadGeometry {
                    sector_size,
                    sector_count,
                });
            }
            let length = i64::from(sector_size) * i64::from(sector_count);
            if length > i64::from(u32::MAX) {
                return Err(Fault::BadGeometry {
                    sector_size,
                    sector_count,
                });
            }
            let tape = m
                .disks
                .open(&name, length as u32)
                .map_err(|err| Fault::Io(err.to_string()))?;
            m.disk = Some(Disk::new(&name, sector_size, sector_count, tape));
            Ok(())
        }
        Instr::UNMOUNT => {
            if m.disk.take().is_none() {
                return Err(Fault::NoDisk);
            }
            Ok(())
        }
        Instr::SEEK => {
            let position = m.data.pop_int()?;
            disk(m)?.seek(position)
        }
        Instr::READBOOL => {
            let value = disk(m)?.read_bool()?;
            m.data.push(Value::Bool(value))
        }
        Instr::READCHAR => {
            let value = disk(m)?.read_char()?;
            m.data.push(Value::Char(value))
        }
        Instr::READINT => {
            let value = disk(m)?.read_int()?;
            m.data.push(Value::Int(value))
        }
        Instr::READFLOAT => {
            let value = disk(m)?.read_float()?;
            m.data.push(Value::Float(value))
        }
        Instr::READSTR => {
            let text = disk(m)?.read_str()?;
            m.data.push_str(&text)
        }
        Instr::WRITEBOOL => {
            let value = m.data.pop_bool()?;
            disk(m)?.write_bool(value)
        }
        Instr::WRITECHAR => {
            let value = m.data.pop_char()?;
            disk(m)?.write_char(value)
        }
        Instr::WRITEINT => {
            let value = m.data.pop_int()?;
            disk(m)?.write_int(value)
        }
        Instr::WRITEFLOAT => {
            let value = m.data.pop_float()?;
            disk(m)?.write_float(value)
        }
        Instr::WRITESTR => {
            let text = m.data.pop_string()?;
            disk(m)?.write_str(&text)
        }
    }
}

fn positive(value: i32) -> Result<i32, Fault> {
    if value > 0 {
        Ok(value)
    } else {
        Err(Fault::NotPositive(value))
    }
}

fn log_level(value: i32) -> Result<LogLevel, Fault> {
    LogLevel::from_i32(value).ok_or(Fault::BadLogLevel(value))
}

fn disk(m: &mut Machine) -> Result<&mut Disk, Fault> {
    m.disk.as_mut().ok_or(Fault::NoDisk)
}

fn tag_test(m: &mut Machine, test: fn(&Value) -> bool) -> Result<(), Fault> {
    let value = m.data.pop()?;
    m.data.push(Value::Bool(test(&value)))
}

fn bool_binary(m: &mut Machine, f: fn(bool, bool) -> bool) -> Result<(), Fault> {
    let b = m.data.pop_bool()?;
    let a = m.data.pop_bool()?;
    m.data.push(Value::Bool(f(a, b)))
}

fn int_binary(m: &mut Machine, f: fn(i32, i32) -> i32) -> Result<(), Fault> {
    let b = m.data.pop_int()?;
    let a = m.data.pop_int()?;
    m.data.push(Value::Int(f(a, b)))
}

fn int_division(m: &mut Machine, f: fn(i32, i32) -> i32) -> Result<(), Fault> {
    let divisor = m.data.pop_int()?;
    let dividend = m.data.pop_int()?;
    if divisor == 0 {
        return Err(Fault::DivisionByZero);
    }
    m.data.push(Value::Int(f(dividend, divisor)))
}

fn int_compare(m: &mut Machine, f: fn(i32, i32) -> bool) -> Result<(), Fault> {
    let b = m.data.pop_int()?;
    let a = m.data.pop_int()?;
    m.data.push(Value::Bool(f(a, b)))
}

fn float_binary(m: &mut Machine, f: fn(f64, f64) -> f64) -> Result<(), Fault> {
    let b = m.data.pop_float()?;
    let a = m.data.pop_float()?;
    m.data.push(Value::Float(f(a, b)))
}

fn float_compare(m: &mut Machine, f: fn(f64, f64) -> bool) -> Result<(), Fault> {
    let b = m.data.pop_float()?;
    let a = m.data.pop_float()?;
    m.data.push(Value::Bool(f(a, b)))
}

fn int_from_str(text: &str) -> Option<i32> {
    if STR_INT_RE.is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

fn hex_from_str(text: &str) -> Option<i32> {
    if !STR_HEX_RE.is_match(text) {
        return None;
    }
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).ok().map(|v| v as i32)
}
