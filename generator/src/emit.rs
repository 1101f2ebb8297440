use std::collections::BTreeSet;

use gl_registry::{ApiExtension, Command, ConsistencyError, Registry, VersionChain};

/// Emitted when no `--prefix` fragment is supplied: the structs the
/// generated tables initialize, the definition macros the command lines
/// expand through, and the loader entry points the suffix is expected to
/// provide.
pub const DEFAULT_PROLOGUE: &str = r#"#pragma once

#include <stdint.h>

#ifndef APIENTRY
#define APIENTRY
#endif

typedef struct {
    uint8_t major;
    uint8_t minor;
    uint8_t loaded;
    const char* names;
    void** funcs;
} bdgl_Version;

typedef struct {
    uint8_t loaded;
    const char* names;
    void** funcs;
} bdgl_Extension;

#ifdef BDGL_IMPL
#define bdgl_def(command, ret, sig, fp, index, call) ret APIENTRY command sig { \
    return ((ret (*)sig)bdgl_fp_##fp[index])call; \
}
#define bdgl_defv(command, sig, fp, index, call) void APIENTRY command sig { \
    ((void (*)sig)bdgl_fp_##fp[index])call; \
}
#else
#define bdgl_def(command, ret, sig, fp, index, call) ret APIENTRY command sig;
#define bdgl_defv(command, sig, fp, index, call) void APIENTRY command sig;
#endif

typedef void* (*bdgl_loadproc)(const char*);

int bdgl_load_version(bdgl_Version* version, bdgl_loadproc loadproc);
int bdgl_load_extension(bdgl_Extension* extension, bdgl_loadproc loadproc);
int bdgl_load_all(bdgl_loadproc loadproc);
"#;

/// Assembles the complete header for one resolved version chain and its
/// linked extensions.
pub fn generate(
    registry: &Registry,
    chain: &VersionChain,
    extensions: &[ApiExtension],
    prefix: &str,
    suffix: Option<&str>,
) -> Result<String, ConsistencyError> {
    let mut out = String::new();
    out.push_str(prefix);

    // the oldest version sits at the top of the output, preceded by the
    // typedefs everything else builds on
    for (gl_type, c_type) in &registry.type_aliases {
        out.push_str(&format!("typedef {c_type} {gl_type};\n"));
    }
    for version in &chain.versions {
        let feature = version.feature;
        write_section(
            registry,
            &feature.name,
            &version.profile.enums,
            &version.profile.commands,
            Some((feature.number_major, feature.number_minor)),
            &mut out,
        )?;
    }

    for extension in extensions {
        write_section(
            registry,
            &extension.name,
            &extension.requires.enums,
            &extension.requires.commands,
            None,
            &mut out,
        )?;
    }

    if let Some(suffix) = suffix {
        out.push_str(suffix);
    }

    write_load_all(chain, &mut out);
    Ok(out)
}

/// One version or extension section: enum defines, the function-pointer
/// table and struct initializer under `BDGL_IMPL`, and the per-command
/// definition macros. `number` distinguishes a version (`bdgl_Version`,
/// with major/minor) from an extension (`bdgl_Extension`).
fn write_section(
    registry: &Registry,
    name: &str,
    enums: &BTreeSet<String>,
    commands: &BTreeSet<String>,
    number: Option<(u8, u8)>,
    out: &mut String,
) -> Result<(), ConsistencyError> {
    out.push_str(&format!("\n//{name}\n"));

    for enum_name in enums {
        let value = registry.enum_value(name, enum_name)?;
        out.push_str(&format!("#define {enum_name} {value}\n"));
    }

    let command_names = sorted_commands(commands);
    let struct_name = if number.is_some() {
        "bdgl_Version"
    } else {
        "bdgl_Extension"
    };

    out.push_str("\n#ifdef BDGL_IMPL\n");
    if !command_names.is_empty() {
        out.push_str(&format!(
            "void* (*bdgl_fp_{name}[{}])();\n",
            command_names.len()
        ));
    }
    out.push_str(&format!("{struct_name} bdgl_{name} = {{\n"));
    if let Some((major, minor)) = number {
        out.push_str(&format!("  .major = {major},\n"));
        out.push_str(&format!("  .minor = {minor},\n"));
    }
    out.push_str("  .loaded = 0,\n");
    out.push_str("  .names = ");
    if command_names.is_empty() {
        // an empty name list and a null function table; extensions that
        // only add enum values still get a struct
        out.push_str("\"\"");
        out.push_str(",\n  .funcs = 0,\n");
    } else {
        for command_name in &command_names {
            out.push_str(&format!("\n\"{command_name}\\0\""));
        }
        out.push_str(&format!(",\n  .funcs = (void**)bdgl_fp_{name},\n"));
    }
    out.push_str("};\n");
    out.push_str("#else\n");
    out.push_str(&format!("extern {struct_name} bdgl_{name};\n"));
    out.push_str("#endif\n");

    for (index, command_name) in command_names.iter().enumerate() {
        let command = registry.command(name, command_name)?;
        write_command(command, name, index, out);
    }
    Ok(())
}

/// One `bdgl_def`/`bdgl_defv` invocation. A command returning non-pointer
/// `void` has no value to forward and takes the `defv` shape.
fn write_command(command: &Command, table: &str, index: usize, out: &mut String) {
    let return_type = &command.prototype.return_type;
    let is_void = return_type.base_name == "void" && !return_type.is_pointer;

    if is_void {
        out.push_str(&format!("bdgl_defv({}", command.prototype.name));
    } else {
        out.push_str(&format!(
            "bdgl_def({},{}",
            command.prototype.name, return_type
        ));
    }

    out.push_str(",(");
    for (i, parameter) in command.parameters.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!("{} {}", parameter.type_, parameter.name));
    }
    out.push_str(&format!("),{table},{index},("));
    for (i, parameter) in command.parameters.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&parameter.name);
    }
    out.push_str("))\n");
}

/// Chains `bdgl_load_version` calls from the target back to the oldest
/// version.
fn write_load_all(chain: &VersionChain, out: &mut String) {
    out.push_str("#ifdef BDGL_IMPL\n");
    out.push_str("int bdgl_load_all(bdgl_loadproc loadproc) {\n");
    out.push_str("  return 0\n");
    for version in chain.versions.iter().rev() {
        out.push_str(&format!(
            "    + bdgl_load_version(&bdgl_{},loadproc)\n",
            version.feature.name
        ));
    }
    out.push_str(";\n}\n");
    out.push_str("#endif\n");
}

/// Command tables need a deterministic, indexable order; the convention is
/// a case-insensitive lexical sort by name.
fn sorted_commands(commands: &BTreeSet<String>) -> Vec<&str> {
    let mut names: Vec<&str> = commands.iter().map(String::as_str).collect();
    names.sort_by_key(|name| name.to_ascii_lowercase());
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_registry::{link, parse_registry};

    const FIXTURE: &str = r#"<registry>
        <enums>
            <enum value="0x0B71" name="GL_DEPTH_TEST"/>
            <enum value="0x1906" name="GL_ALPHA"/>
        </enums>
        <commands>
            <command>
                <proto>void <name>glClear</name></proto>
                <param><ptype>GLbitfield</ptype> <name>mask</name></param>
            </command>
            <command>
                <proto>const <ptype>GLubyte</ptype> *<name>glGetString</name></proto>
                <param><ptype>GLenum</ptype> <name>name</name></param>
            </command>
            <command>
                <proto>void <name>glBlendColor</name></proto>
            </command>
        </commands>
        <feature api="gl" name="GL_VERSION_1_0" number="1.0">
            <require>
                <enum name="GL_DEPTH_TEST"/>
                <enum name="GL_ALPHA"/>
                <command name="glClear"/>
                <command name="glGetString"/>
                <command name="glBlendColor"/>
            </require>
        </feature>
        <extensions>
            <extension name="GL_ARB_enum_only" supported="gl">
                <require><enum name="GL_ALPHA"/></require>
            </extension>
        </extensions>
    </registry>"#;

    fn header() -> String {
        let registry = parse_registry(FIXTURE).unwrap();
        let apis = link(&registry).unwrap();
        let api = &apis["gl"];
        let chain = api.link_version("1.0", "core").unwrap();
        let extensions = api.link_extensions("core", None).unwrap();
        generate(&registry, &chain, &extensions, DEFAULT_PROLOGUE, None).unwrap()
    }

    #[test]
    fn emits_typedefs_and_enum_defines() {
        let header = header();
        assert!(header.contains("typedef unsigned int GLenum;\n"));
        assert!(header.contains("#define GL_DEPTH_TEST 0x0B71\n"));
        assert!(header.contains("#define GL_ALPHA 0x1906\n"));
    }

    #[test]
    fn void_and_returning_commands_take_different_macros() {
        let header = header();
        assert!(header.contains("bdgl_defv(glClear,(GLbitfield mask),GL_VERSION_1_0,"));
        assert!(header
            .contains("bdgl_def(glGetString,const GLubyte*,(GLenum name),GL_VERSION_1_0,"));
    }

    #[test]
    fn command_tables_are_sorted_case_insensitively() {
        let header = header();
        let blend = header.find("\"glBlendColor\\0\"").unwrap();
        let clear = header.find("\"glClear\\0\"").unwrap();
        let get_string = header.find("\"glGetString\\0\"").unwrap();
        assert!(blend < clear && clear < get_string);
        // indices follow the same order
        assert!(header.contains(",GL_VERSION_1_0,0,()"));
    }

    #[test]
    fn enum_only_extension_gets_empty_table() {
        let header = header();
        assert!(header.contains("//GL_ARB_enum_only\n"));
        let section = &header[header.find("//GL_ARB_enum_only").unwrap()..];
        assert!(section.contains(".names = \"\""));
        assert!(section.contains(".funcs = 0,"));
        assert!(!section.contains("bdgl_fp_GL_ARB_enum_only"));
    }

    #[test]
    fn load_all_walks_the_chain() {
        let header = header();
        assert!(header.contains("int bdgl_load_all(bdgl_loadproc loadproc)"));
        assert!(header.contains("+ bdgl_load_version(&bdgl_GL_VERSION_1_0,loadproc)"));
    }

    #[test]
    fn dangling_enum_reference_fails() {
        let registry = parse_registry(
            r#"<registry>
                <feature api="gl" name="V1_0" number="1.0">
                    <require><enum name="GL_NOT_DEFINED"/></require>
                </feature>
            </registry>"#,
        )
        .unwrap();
        let apis = link(&registry).unwrap();
        let chain = apis["gl"].link_version("1.0", "core").unwrap();
        let error = generate(&registry, &chain, &[], "", None).unwrap_err();
        assert!(matches!(error, ConsistencyError::UnknownEnum { .. }));
    }
}
