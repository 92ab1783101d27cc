//! Zero-value expressions per type kind.
//!
//! Maps, slices, arrays and channels get constructed empty values rather
//! than `nil`, so the filled literal is ready to use.

use super::typeexpr::{func_type, TypeReconstructor};
use crate::ast::Expr;
use crate::types::{BasicInfo, Type, TypeArena, TypeId};

/// The zero value for a member of type `ty`, or `None` when none can be
/// written down.
pub fn populate_value(arena: &TypeArena, types: &dyn TypeReconstructor, ty: TypeId) -> Option<Expr> {
    populate(arena, types, ty, &mut Vec::new())
}

/// `pointees` holds the types already entered through a pointer on the way
/// here; meeting one again means a cyclic pointer type (`type P *P`).
fn populate(
    arena: &TypeArena,
    types: &dyn TypeReconstructor,
    ty: TypeId,
    pointees: &mut Vec<TypeId>,
) -> Option<Expr> {
    let ty = arena.unalias(ty);
    match arena.get(arena.underlying(ty)) {
        Type::Basic(kind) => {
            let info = kind.info();
            if info.intersects(BasicInfo::NUMERIC) {
                Some(Expr::basic("0"))
            } else if info.intersects(BasicInfo::BOOLEAN) {
                Some(Expr::ident("false"))
            } else if info.intersects(BasicInfo::STRING) {
                Some(Expr::basic(r#""""#))
            } else if info.intersects(BasicInfo::UNSAFE_POINTER) {
                Some(Expr::ident("nil"))
            } else {
                unreachable!("basic type {:?} has no classification", kind)
            }
        }
        Type::Map(map) => Some(Expr::empty_composite(Expr::MapType {
            key: Box::new(types.type_expr(map.key)?),
            value: Box::new(types.type_expr(map.value)?),
        })),
        Type::Slice(elem) => Some(Expr::empty_composite(Expr::ArrayType {
            len: None,
            elt: Box::new(types.type_expr(*elem)?),
        })),
        Type::Array(array) => Some(Expr::empty_composite(Expr::ArrayType {
            len: Some(Box::new(Expr::basic(array.len.to_string()))),
            elt: Box::new(types.type_expr(array.elem)?),
        })),
        Type::Chan(chan) => Some(Expr::call(
            Expr::ident("make"),
            vec![Expr::ChanType {
                dir: chan.dir,
                value: Box::new(types.type_expr(chan.elem)?),
            }],
        )),
        Type::Struct(_) => Some(Expr::empty_composite(types.type_expr(ty)?)),
        Type::Signature(sig) => func_type(types, sig, true).map(Expr::FuncLit),
        Type::Pointer(elem) => {
            let elem = arena.unalias(*elem);
            if pointees.contains(&elem) {
                return None;
            }
            pointees.push(elem);
            let pointee = populate(arena, types, elem, pointees)?;
            Some(Expr::AddressOf(Box::new(pointee)))
        }
        Type::Interface(_) => Some(Expr::ident("nil")),
        Type::Invalid | Type::Named(_) | Type::Alias(_) => None,
    }
}
