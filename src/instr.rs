use std::collections::HashMap;

use lazy_static::lazy_static;

/// Words that can never name a label: `BEGIN` sets the entry point and the
/// boolean spellings are literals.
pub const RESERVED: &[&str] = &["BEGIN", "TRUE", "FALSE"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED
        .iter()
        .any(|word| word.eq_ignore_ascii_case(name))
}

macro_rules! instructions {
    ($( $(#[$meta:meta])* $name:ident, )+) => {
        /// Built-in instruction set.
        ///
        /// Stack effects are written `( before -- after )` with the top of
        /// the stack rightmost. `PUSH` is not listed here: the assembler
        /// synthesises it for every literal and resolved label reference.
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub enum Instr {
            $( $(#[$meta])* $name, )+
        }

        impl Instr {
            /// Every instruction, in declaration order.
            pub const ALL: &'static [Instr] = &[ $( Instr::$name, )+ ];

            /// Upper-case mnemonic, as written in source programs.
            pub fn name(self) -> &'static str {
                match self {
                    $( Instr::$name => stringify!($name), )+
                }
            }
        }
    };
}

instructions! {
    // ----- stack -----
    /// `( x -- )` removes the top value.
    POP,
    /// `( x1..xn n -- )` removes the top `n` values; `n` > 0.
    POPN,
    /// `( x -- x x )` duplicates the top value.
    DUP,
    /// `( x1..xn n -- x1..xn x1..xn )` duplicates the top `n` values as a
    /// block; `n` > 0.
    DUPN,
    /// `( x y -- y x )` exchanges the top two values.
    SWAP,
    /// `( ... n -- ... )` rotates the top `|n|` values; positive `n` turns
    /// clockwise (top sinks to the bottom of the window), negative turns
    /// counter-clockwise; `n` != 0.
    ROTATE,
    /// `( ... k -- ... xk )` copies the `k`-th value from the top; `k` >= 1.
    PICK,
    /// `( ... v k -- ... )` replaces the `k`-th value from the top of the
    /// remaining stack with `v`; `k` >= 1.
    PUT,
    /// `( -- n )` pushes the current stack depth.
    DEPTH,
    /// `( r2 n2 r1 n1 -- r2r1 n1+n2 )` concatenates the two topmost
    /// ranges; either count may be 0.
    JOIN,
    /// `( x1..xn n i -- x1..xi i x(i+1)..xn n-i )` splits the topmost
    /// range after its first-pushed `i` elements; 0 <= `i` < `n`.
    SPLIT,

    // ----- control flow -----
    /// Does nothing.
    NOOP,
    /// `( lbl -- )` continues at the label's address.
    JUMP,
    /// `( b lbl -- )` continues at the label's address iff `b` is true.
    CJUMP,
    /// `( lbl -- )` saves the address of the next instruction on the call
    /// stack and continues at the label's address.
    CALL,
    /// Continues at the address on top of the call stack.
    RETURN,
    /// `( str n -- code )` assembles and runs the popped source text in a
    /// fresh code segment and call stack, then pushes its exit code; the
    /// data stack and any mounted disk are shared. At most 16 frames deep.
    EXECUTE,
    /// `( n -- )` halts cleanly with exit code `n`.
    EXIT,
    /// `( str n -- )` raises a runtime error carrying the popped message.
    ABORT,

    // ----- I/O -----
    /// `( x -- )` writes the value to the main output stream.
    PRINT,
    /// `( str n -- )` writes a character range to the main output stream.
    PRINTSTR,
    /// `( x -- )` writes the value to the error stream.
    ERROR,
    /// `( str n -- )` writes a character range to the error stream.
    ERRORSTR,
    /// `( -- str n )` blocks for one line of input, terminator stripped.
    GETLINE,
    /// `( x lvl -- )` logs the value at level `lvl`; 0 <= `lvl` <= 3.
    LOG,
    /// `( str n lvl -- )` logs a character range at level `lvl`.
    LOGSTR,
    /// `( b -- )` switches the per-instruction debug trace on or off.
    DEBUG,
    /// `( -- ' ' )` pushes a space character.
    SPACE,
    /// `( -- '\t' )` pushes a tab character.
    TAB,
    /// `( -- '\n' )` pushes a newline character.
    NEWLINE,

    // ----- conversion -----
    /// `( x -- str n )` pushes the textual form; characters are wrapped in
    /// single quotes.
    TOSTRING,
    /// `( str n -- i )` parses a decimal integer; unparseable input is a
    /// runtime error.
    STRTOI,
    /// `( str n -- f )` parses a float; unparseable input is a runtime
    /// error.
    STRTOF,
    /// `( str n -- b )` true iff the text is `true`, case-insensitively.
    STRTOB,
    /// `( str n -- i )` parses up to 8 hex digits, `0x` prefix optional;
    /// unparseable input is a runtime error.
    HEXTOI,
    /// `( i -- str n )` lower-case hex rendering without prefix.
    ITOHEX,
    /// `( i -- f )` exact conversion.
    ITOF,
    /// `( f -- i )` truncates toward zero.
    FTOI,
    /// `( i -- b )` true iff nonzero.
    ITOB,
    /// `( b -- i )` 1 for true, 0 for false.
    BTOI,
    /// `( f -- b )` true iff nonzero.
    FTOB,
    /// `( c -- i )` ASCII code of the character.
    CTOI,
    /// `( i -- c )` character for an ASCII code; 0 <= `i` <= 127.
    ITOC,

    // ----- classification -----
    /// `( str n -- b )` matches `-?[0-9]{1,10}` and fits a 32-bit integer.
    STRISINT,
    /// `( str n -- b )` matches `(0x)?[0-9a-f]{1,8}`, case-insensitively.
    STRISHEX,
    /// `( str n -- b )` matches `true` or `false`, case-insensitively.
    STRISBOOL,
    /// `( str n -- b )` parseable as an IEEE-754 float.
    STRISFLOAT,
    /// `( x -- b )` tag test; accepts any value.
    ISBOOL,
    ISCHAR,
    ISINT,
    ISFLOAT,
    ISLABEL,

    // ----- logic -----
    /// `( a b -- a&&b )`
    AND,
    /// `( a b -- a||b )`
    OR,
    /// `( a b -- a^b )`
    XOR,
    /// `( a -- !a )`
    NOT,

    // ----- bitwise -----
    /// `( a b -- a&b )`
    BAND,
    /// `( a b -- a|b )`
    BOR,
    /// `( a b -- a^b )`
    BXOR,
    /// `( a -- ~a )`
    BNOT,
    /// `( a n -- a<<n )` shift count masked to 0..=31.
    SHIFTL,
    /// `( a n -- a>>n )` arithmetic shift, count masked to 0..=31.
    SHIFTR,

    // ----- comparison -----
    /// `( a b -- a==b )` on integers.
    EQUALS,
    LESS,
    GREATER,
    LESSEQ,
    GREATEREQ,
    /// `( a b -- a==b )` true iff the floats are bit-identical.
    FEQUALS,
    FLESS,
    FGREATER,

    // ----- math -----
    /// `( a b -- a+b )` two's-complement wrapping.
    IADD,
    ISUB,
    IMUL,
    /// `( a b -- a/b )` division by zero is a runtime error.
    IDIV,
    /// `( a b -- a%b )` modulus by zero is a runtime error.
    MOD,
    /// `( b e -- b^e )` nearest integer to the mathematical result.
    IPOW,
    /// `( n -- r )` uniform random integer in `[0, n)`; `n` > 0.
    RAND,
    /// `( a b -- a+b )` on floats. (`FADD` would assemble as the hex
    /// literal 0xFADD, so the mnemonic is FSUM.)
    FSUM,
    FSUB,
    FMUL,
    /// `( a b -- a/b )` division by exactly 0.0 is a runtime error.
    FDIV,

    // ----- time -----
    /// `( -- h m s )` local wall-clock time, hour pushed first.
    GETTIME,
    /// `( -- y mo d )` local date, year pushed first.
    GETDATE,
    /// `( ms -- )` blocks for `ms` milliseconds; `ms` > 0. An interrupted
    /// sleep halts with exit code 1.
    SLEEP,

    // ----- disk -----
    /// `( str n sz cnt -- )` mounts a disk named by the range with `cnt`
    /// sectors of `sz` bytes, silently replacing any mounted disk.
    MOUNT,
    /// Unmounts the current disk; an error when none is mounted.
    UNMOUNT,
    /// `( pos -- )` moves the cursor; 0 <= `pos` < size.
    SEEK,
    /// `( -- b )` reads 1 byte at the cursor, nonzero is true.
    READBOOL,
    /// `( -- c )` reads 1 ASCII byte at the cursor.
    READCHAR,
    /// `( -- i )` reads 4 bytes big-endian at the cursor.
    READINT,
    /// `( -- f )` reads 8 bytes big-endian at the cursor.
    READFLOAT,
    /// `( -- str n )` reads a 4-byte length then that many bytes.
    READSTR,
    /// `( b -- )` writes 1 byte at the cursor.
    WRITEBOOL,
    /// `( c -- )` writes 1 byte at the cursor.
    WRITECHAR,
    /// `( i -- )` writes 4 bytes big-endian at the cursor.
    WRITEINT,
    /// `( f -- )` writes 8 bytes big-endian at the cursor.
    WRITEFLOAT,
    /// `( str n -- )` writes a 4-byte length then the bytes.
    WRITESTR,
}

lazy_static! {
    static ref TABLE: HashMap<&'static str, Instr> =
        Instr::ALL.iter().map(|&i| (i.name(), i)).collect();
}

/// Case-insensitive mnemonic lookup.
pub fn lookup(name: &str) -> Option<Instr> {
    TABLE.get(name.to_ascii_uppercase().as_str()).copied()
}

impl std::fmt::Display for Instr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
