use bcrypt::{BcryptError, hash, verify};

#[cfg(not(test))]
const BCRYPT_COST: u32 = 10;
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, BCRYPT_COST)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, BcryptError> {
    verify(password, hashed)
}
