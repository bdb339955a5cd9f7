use rand::Rng;

/// 手动核验码字符集（去掉易混淆的 0/O/1/I）
pub const MANUAL_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成指定长度的手动核验码
/// ThreadRng 为密码学安全的随机源；唯一性由调用方在事务内检查
pub fn generate_manual_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| MANUAL_CODE_ALPHABET[rng.gen_range(0..MANUAL_CODE_ALPHABET.len())] as char)
        .collect()
}

/// 规范化用户输入的核验码（去空白、转大写）
pub fn normalize_manual_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}
