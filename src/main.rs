use aesnest::{
    AesCipher, CipherMode, HashFunction, KdfParams, PaddingMode, RandomSource, derive_key,
    derive_key_argon2, generate_and_persist_key_store, hash_str, key_store_path, load_key_store,
    storage::file_name_of,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod auth;

#[derive(Debug, clap::Args)]
struct CipherArgs {
    /// Padding mode: none, pkcs7, zeros, ansix923, iso10126
    #[arg(long, default_value = "pkcs7")]
    padding: PaddingMode,

    /// Cipher mode: cbc, ecb
    #[arg(long, default_value = "cbc")]
    mode: CipherMode,
}

#[derive(Debug, clap::Args)]
struct Argon2Args {
    /// Derive with Argon2id instead of the iterated hash chain
    #[arg(long)]
    argon2: bool,

    /// Argon2 memory cost in KiB (default: 65536)
    #[arg(long = "argon-mem", requires = "argon2")]
    mem_cost_kib: Option<u32>,

    /// Argon2 time cost / iterations (default: 3)
    #[arg(long = "argon-time", requires = "argon2")]
    time_cost: Option<u32>,

    /// Argon2 parallelism (default: 1)
    #[arg(long = "argon-parallelism", requires = "argon2")]
    parallelism: Option<u32>,
}

impl Argon2Args {
    fn to_kdf_params(&self) -> Result<KdfParams> {
        let default = KdfParams::default();

        Ok(KdfParams::new(
            self.mem_cost_kib.unwrap_or(default.mem_cost_kib()),
            self.time_cost.unwrap_or(default.time_cost()),
            self.parallelism.unwrap_or(default.parallelism()),
        )?)
    }
}

#[derive(Debug, Parser)]
#[command(name = "aesnest")]
#[command(
    version,
    about = "AES key stores, file encryption, hashing and key derivation."
)]
struct Cli {
    /// Path to the .keystore file used by encrypt, decrypt and info
    #[arg(long, global = true, value_name = "PATH", env = "AESNEST_KEYSTORE")]
    keystore: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generates a key and IV and writes them to <PATH>.keystore
    Keygen {
        /// Key size in bits: 128, 192 or 256
        #[arg(long, default_value_t = 256)]
        size: usize,

        /// Base path; ".keystore" is appended
        path: Option<PathBuf>,
    },

    /// Encrypts a file into <FILE>.enc
    #[command(arg_required_else_help = true)]
    Encrypt {
        file: PathBuf,
        #[command(flatten)]
        cipher: CipherArgs,
    },

    /// Decrypts <FILE>.enc back into <FILE>
    #[command(arg_required_else_help = true)]
    Decrypt {
        file: PathBuf,
        #[command(flatten)]
        cipher: CipherArgs,
    },

    /// Prints the uppercase hex digest of a string
    #[command(arg_required_else_help = true)]
    Hash {
        #[arg(short, long, default_value = "sha256")]
        function: HashFunction,
        text: String,
    },

    /// Derives key material from a passphrase
    Derive {
        /// Salt as hex
        #[arg(long)]
        salt: String,

        #[arg(short, long, default_value = "sha256")]
        function: HashFunction,

        #[arg(short, long, default_value_t = 1000)]
        iterations: u32,

        #[command(flatten)]
        argon2: Argon2Args,
    },

    /// Prints a pseudorandom number in [min, max)
    Random {
        #[arg(long, default_value_t = 0)]
        min: i32,

        #[arg(long, default_value_t = i32::MAX)]
        max: i32,

        /// Seed for a reproducible value
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Shows information about the key store
    Info,
}

fn default_keystore_base() -> Result<PathBuf> {
    let project_dirs =
        ProjectDirs::from("", "", "aesnest").context("could not determine platform directories")?;

    Ok(project_dirs.data_dir().join("default"))
}

fn resolve_keystore(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p),
        None => Ok(key_store_path(default_keystore_base()?)),
    }
}

fn open_cipher(keystore: Option<PathBuf>, args: &CipherArgs) -> Result<AesCipher> {
    let path = resolve_keystore(keystore)?;
    let store = load_key_store(&path)
        .with_context(|| format!("cannot open key store {}", path.display()))?
        .with_context(|| {
            format!(
                "key store {} could not be read; an error log was written next to it",
                path.display()
            )
        })?;

    Ok(AesCipher::with_options(
        store.key_size(),
        store.key(),
        store.iv(),
        args.padding,
        args.mode,
    )?)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Cli::parse();
    match args.command {
        Commands::Keygen { size, path } => {
            let base = match path {
                Some(p) => p,
                None => default_keystore_base()?,
            };
            match generate_and_persist_key_store(size, &base)? {
                Some(_) => println!("key store written to {}", key_store_path(&base).display()),
                None => bail!(
                    "could not write {}; an error log was written next to it",
                    key_store_path(&base).display()
                ),
            }
        }
        Commands::Encrypt { file, cipher } => {
            let aes = open_cipher(args.keystore, &cipher)?;
            let out = aes
                .encrypt_file(&file)
                .with_context(|| format!("failed to encrypt {}", file.display()))?;
            println!("encrypted to {}", out.display());
        }
        Commands::Decrypt { file, cipher } => {
            let aes = open_cipher(args.keystore, &cipher)?;
            let out = aes
                .decrypt_file(&file)
                .with_context(|| format!("failed to decrypt {}", file.display()))?;
            println!("decrypted to {}", out.display());
        }
        Commands::Hash { function, text } => {
            println!("{}", hash_str(function, &text)?);
        }
        Commands::Derive {
            salt,
            function,
            iterations,
            argon2,
        } => {
            let salt = hex::decode(salt.trim()).context("salt must be hex")?;
            let passphrase = auth::read_passphrase()?;

            let key = if argon2.argon2 {
                let kdf = argon2.to_kdf_params()?;
                hex::encode_upper(&derive_key_argon2(&passphrase, &salt, kdf)?[..])
            } else {
                hex::encode_upper(&derive_key(&passphrase, &salt, function, iterations)?[..])
            };
            drop(passphrase);
            println!("{key}");
        }
        Commands::Random { min, max, seed } => {
            let mut rng = match seed {
                Some(s) => RandomSource::from_seed(s),
                None => RandomSource::new(),
            };
            println!("{}", rng.number_between(min, max)?);
        }
        Commands::Info => {
            let path = resolve_keystore(args.keystore)?;
            let name = file_name_of(&path)?;
            let store = load_key_store(&path)?
                .with_context(|| format!("key store {} could not be read", path.display()))?;

            println!("key store: {name}");
            println!("location:  {}", path.display());
            println!("key size:  {} bits", store.key_size());
        }
    }

    Ok(())
}
