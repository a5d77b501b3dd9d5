use proc_macro::TokenStream;
use quote::quote;
use syn::DeriveInput;

/// Implements `nexus_ecs::Component` for a struct and registers it with typetag so that it can travel inside a
/// serialized `World`. The type must also implement serde's `Serialize` and `Deserialize`.
#[proc_macro_derive(Component)]
pub fn component(input: TokenStream) -> TokenStream {
    let input = match syn::parse::<DeriveInput>(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error().into(),
    };
    let name = input.ident;

    quote!(
        #[::nexus_ecs::typetag::serde]
        impl ::nexus_ecs::Component for #name {
            fn inject(self: ::std::boxed::Box<Self>, w: &mut ::nexus_ecs::world::World, e: ::nexus_ecs::Entity) {
                // The world only hands out live entities to the deserializer
                let _ = w.attach::<Self>(e, *self);
            }
        }
    ).into()
}
