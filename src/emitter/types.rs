//! Type node visitor.

use super::writer::JsonWriter;
use crate::parser::ast::{TypeKind, TypeNode};
use std::io::{self, Write};

/// Write a type node and its children as one JSON object.
pub fn write_type_node<W: Write>(
    out: &mut JsonWriter<W>,
    node: &TypeNode,
) -> io::Result<()> {
    out.begin_object()?;
    let qualifiers = node.qualifiers;
    out.flag("const", qualifiers.is_const)?;
    out.flag("mutable", qualifiers.is_mutable)?;
    out.flag("volatile", qualifiers.is_volatile)?;
    out.flag("static", qualifiers.is_static)?;
    out.field("type", node.tag())?;

    match &node.kind {
        TypeKind::Literal { name } => out.field("name", name.as_str())?,
        TypeKind::Pointer(base)
        | TypeKind::Reference(base)
        | TypeKind::RvalueReference(base) => {
            out.key("baseType")?;
            write_type_node(out, base)?;
        }
        TypeKind::Template { name, arguments } => {
            out.field("name", name.as_str())?;
            out.key("arguments")?;
            out.begin_array()?;
            for argument in arguments {
                write_type_node(out, argument)?;
            }
            out.end_array()?;
        }
        TypeKind::Function {
            returns,
            parameters,
        } => {
            out.key("returnType")?;
            write_type_node(out, returns)?;
            out.key("arguments")?;
            out.begin_array()?;
            for parameter in parameters {
                out.begin_object()?;
                if let Some(name) = &parameter.name {
                    out.field("name", name.as_str())?;
                }
                out.key("type")?;
                write_type_node(out, &parameter.ty)?;
                out.end_object()?;
            }
            out.end_array()?;
        }
    }

    out.end_object()
}
