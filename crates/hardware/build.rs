use std::env;

/// Architectures a simulator binary can be built for, as spelled in `TARGET_ISA`.
const SUPPORTED_ISAS: [&str; 4] = ["alpha", "mips", "sparc", "arm"];

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-env-changed=TARGET_ISA");
    println!(
        "cargo::rustc-check-cfg=cfg(sim_isa, values(\"alpha\", \"mips\", \"sparc\", \"arm\"))"
    );

    let isa = match select_isa(env::var("TARGET_ISA").ok().as_deref()) {
        Ok(isa) => isa,
        Err(msg) => panic!("{msg}"),
    };

    println!("cargo::rustc-cfg=sim_isa=\"{isa}\"");
}

fn select_isa(raw: Option<&str>) -> Result<&'static str, String> {
    let Some(raw) = raw else {
        return Err(format!(
            "TARGET_ISA is not set; choose the simulated architecture with \
             TARGET_ISA=<{}>",
            SUPPORTED_ISAS.join("|")
        ));
    };

    let wanted = raw.trim().to_ascii_lowercase();
    SUPPORTED_ISAS
        .iter()
        .find(|&&isa| isa == wanted)
        .copied()
        .ok_or_else(|| {
            format!(
                "TARGET_ISA={raw:?} is not a supported architecture; expected one of: {}",
                SUPPORTED_ISAS.join(", ")
            )
        })
}
