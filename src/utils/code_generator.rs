use rand::RngCore;

pub const CODE_PREFIX: &str = "QR_";
const CODE_BYTES: usize = 8;

/// Source of candidate session codes. Uniqueness is settled by the store.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `QR_` followed by 16 upper-case hex digits from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; CODE_BYTES];
        rand::rng().fill_bytes(&mut bytes);

        let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
        format!("{}{}", CODE_PREFIX, hex)
    }
}
