//! IFJcode instruction set
//!
//! One opcode per mnemonic, grouped by family. Discriminants are dense so the
//! dispatch table can be indexed by `opcode as usize`.

/// IFJcode opcode
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ===== Frames and variables =====
    /// `MOVE var symb`
    Move,
    /// `CREATEFRAME`: reset the temporary frame
    CreateFrame,
    /// `PUSHFRAME`: copy the temporary frame onto the local-frame stack
    PushFrame,
    /// `POPFRAME`: move the top local frame into the temporary frame
    PopFrame,
    /// `DEFVAR var`
    DefVar,

    // ===== Calls =====
    /// `CALL label`
    Call,
    /// `RETURN`
    Return,

    // ===== Value stack =====
    /// `PUSHS symb`
    PushS,
    /// `POPS var`
    PopS,
    /// `CLEARS`
    ClearS,

    // ===== Arithmetic =====
    Add,
    Sub,
    Mul,
    Div,
    AddS,
    SubS,
    MulS,
    DivS,

    // ===== Relational =====
    Lt,
    Gt,
    Eq,
    LtS,
    GtS,
    EqS,

    // ===== Logical =====
    And,
    Or,
    Not,
    AndS,
    OrS,
    NotS,

    // ===== Conversions =====
    Int2Float,
    Float2Int,
    Float2R2EInt,
    Float2R2OInt,
    Int2Char,
    Stri2Int,
    Int2FloatS,
    Float2IntS,
    Float2R2EIntS,
    Float2R2OIntS,
    Int2CharS,
    Stri2IntS,

    // ===== I/O =====
    /// `READ var type`
    Read,
    /// `WRITE symb`
    Write,

    // ===== Strings =====
    Concat,
    Strlen,
    GetChar,
    SetChar,

    // ===== Types =====
    /// `TYPE var symb`
    Type,

    // ===== Control flow =====
    /// `LABEL label`: resolved ahead of time, no-op at run time
    Label,
    /// `JUMP label`
    Jump,
    /// `JUMPIFEQ label symb symb`
    JumpIfEq,
    /// `JUMPIFNEQ label symb symb`
    JumpIfNeq,
    /// `JUMPIFEQS label`
    JumpIfEqS,
    /// `JUMPIFNEQS label`
    JumpIfNeqS,

    // ===== Debugging =====
    /// `BREAK`: dump the execution state to stderr
    Break,
    /// `DPRINT symb`: dump a value to stderr
    DPrint,
}

impl Opcode {
    /// Number of opcodes
    pub const COUNT: usize = Self::ALL.len();

    /// Every opcode, in discriminant order
    pub const ALL: [Opcode; 57] = [
        Opcode::Move,
        Opcode::CreateFrame,
        Opcode::PushFrame,
        Opcode::PopFrame,
        Opcode::DefVar,
        Opcode::Call,
        Opcode::Return,
        Opcode::PushS,
        Opcode::PopS,
        Opcode::ClearS,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::AddS,
        Opcode::SubS,
        Opcode::MulS,
        Opcode::DivS,
        Opcode::Lt,
        Opcode::Gt,
        Opcode::Eq,
        Opcode::LtS,
        Opcode::GtS,
        Opcode::EqS,
        Opcode::And,
        Opcode::Or,
        Opcode::Not,
        Opcode::AndS,
        Opcode::OrS,
        Opcode::NotS,
        Opcode::Int2Float,
        Opcode::Float2Int,
        Opcode::Float2R2EInt,
        Opcode::Float2R2OInt,
        Opcode::Int2Char,
        Opcode::Stri2Int,
        Opcode::Int2FloatS,
        Opcode::Float2IntS,
        Opcode::Float2R2EIntS,
        Opcode::Float2R2OIntS,
        Opcode::Int2CharS,
        Opcode::Stri2IntS,
        Opcode::Read,
        Opcode::Write,
        Opcode::Concat,
        Opcode::Strlen,
        Opcode::GetChar,
        Opcode::SetChar,
        Opcode::Type,
        Opcode::Label,
        Opcode::Jump,
        Opcode::JumpIfEq,
        Opcode::JumpIfNeq,
        Opcode::JumpIfEqS,
        Opcode::JumpIfNeqS,
        Opcode::Break,
        Opcode::DPrint,
    ];

    /// Upper-case mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::ClearS => "CLEARS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::AddS => "ADDS",
            Opcode::SubS => "SUBS",
            Opcode::MulS => "MULS",
            Opcode::DivS => "DIVS",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::LtS => "LTS",
            Opcode::GtS => "GTS",
            Opcode::EqS => "EQS",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::AndS => "ANDS",
            Opcode::OrS => "ORS",
            Opcode::NotS => "NOTS",
            Opcode::Int2Float => "INT2FLOAT",
            Opcode::Float2Int => "FLOAT2INT",
            Opcode::Float2R2EInt => "FLOAT2R2EINT",
            Opcode::Float2R2OInt => "FLOAT2R2OINT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Int2FloatS => "INT2FLOATS",
            Opcode::Float2IntS => "FLOAT2INTS",
            Opcode::Float2R2EIntS => "FLOAT2R2EINTS",
            Opcode::Float2R2OIntS => "FLOAT2R2OINTS",
            Opcode::Int2CharS => "INT2CHARS",
            Opcode::Stri2IntS => "STRI2INTS",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::JumpIfEqS => "JUMPIFEQS",
            Opcode::JumpIfNeqS => "JUMPIFNEQS",
            Opcode::Break => "BREAK",
            Opcode::DPrint => "DPRINT",
        }
    }

    /// Look up an opcode by mnemonic (case-insensitive)
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    /// Whether the first operand of this opcode names a jump target
    pub fn targets_label(self) -> bool {
        matches!(
            self,
            Opcode::Call
                | Opcode::Jump
                | Opcode::JumpIfEq
                | Opcode::JumpIfNeq
                | Opcode::JumpIfEqS
                | Opcode::JumpIfNeqS
        )
    }
}
